//! # Safety Check Kinds
//!
//! @title Check Evidence Table
//! @author Ramprasad
//!
//! Closed set of safety checks a threat rule can require, and the literal
//! substrings whose presence is taken as evidence that a check exists.
//!
//! ## Evidence Model
//!
//! A check is considered present in a context when any of its evidence
//! substrings appears verbatim (case-sensitive). This is a text heuristic
//! and deliberately knows nothing about Move semantics.

use serde::{Deserialize, Serialize};

/// A safety condition a threat rule expects to find near risky code.
///
/// Serialized in snake_case, matching the catalog spelling. The catalog
/// aliases `signer.address` and `max_supply` parse to [`CheckKind::SignerCheck`]
/// and [`CheckKind::MaxSupplyCheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    #[serde(alias = "signer.address")]
    SignerCheck,
    #[serde(alias = "max_supply")]
    MaxSupplyCheck,
    ReentrancyGuard,
    TypeVerification,
    ShiftLimit,
    SlippageGuard,
    OracleUpdateGuard,
    BlockDelay,
    IterationLimit,
    GasBudgetLimit,
    RefundCap,
    FinalityCheck,
    ParallelSafety,
    StateUpdateFirst,
    FieldExistence,
    TimeWindowLimit,
}

impl CheckKind {
    /// Every check kind, in declaration order.
    pub const ALL: [CheckKind; 16] = [
        CheckKind::SignerCheck,
        CheckKind::MaxSupplyCheck,
        CheckKind::ReentrancyGuard,
        CheckKind::TypeVerification,
        CheckKind::ShiftLimit,
        CheckKind::SlippageGuard,
        CheckKind::OracleUpdateGuard,
        CheckKind::BlockDelay,
        CheckKind::IterationLimit,
        CheckKind::GasBudgetLimit,
        CheckKind::RefundCap,
        CheckKind::FinalityCheck,
        CheckKind::ParallelSafety,
        CheckKind::StateUpdateFirst,
        CheckKind::FieldExistence,
        CheckKind::TimeWindowLimit,
    ];

    /// Returns the canonical catalog spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::SignerCheck => "signer_check",
            CheckKind::MaxSupplyCheck => "max_supply_check",
            CheckKind::ReentrancyGuard => "reentrancy_guard",
            CheckKind::TypeVerification => "type_verification",
            CheckKind::ShiftLimit => "shift_limit",
            CheckKind::SlippageGuard => "slippage_guard",
            CheckKind::OracleUpdateGuard => "oracle_update_guard",
            CheckKind::BlockDelay => "block_delay",
            CheckKind::IterationLimit => "iteration_limit",
            CheckKind::GasBudgetLimit => "gas_budget_limit",
            CheckKind::RefundCap => "refund_cap",
            CheckKind::FinalityCheck => "finality_check",
            CheckKind::ParallelSafety => "parallel_safety",
            CheckKind::StateUpdateFirst => "state_update_first",
            CheckKind::FieldExistence => "field_existence",
            CheckKind::TimeWindowLimit => "time_window_limit",
        }
    }

    /// Literal substrings that count as evidence of this check.
    pub fn evidence(&self) -> &'static [&'static str] {
        match self {
            CheckKind::SignerCheck => &["tx_context::sender", "signer::"],
            CheckKind::MaxSupplyCheck => &["MAX_SUPPLY", "total_supply"],
            CheckKind::ReentrancyGuard => &["reentrancy_guard", "ReentrancyGuard"],
            CheckKind::TypeVerification => &["assert!", "dynamic_field::exists"],
            CheckKind::ShiftLimit => &["MAX_SHIFT", "< 64", "< 128"],
            CheckKind::SlippageGuard => &["min_amount_out", "min_out", "slippage"],
            CheckKind::OracleUpdateGuard => &["last_update", "staleness", "MAX_PRICE_AGE"],
            CheckKind::BlockDelay => &["tx_context::epoch", "epoch(", "delay"],
            CheckKind::IterationLimit => &["MAX_ITERATIONS", "max_iterations", "MAX_LOOP"],
            CheckKind::GasBudgetLimit => &["gas_budget", "MAX_GAS"],
            CheckKind::RefundCap => &["MAX_REFUND", "refund_cap"],
            CheckKind::FinalityCheck => &["finalized", "is_final", "confirmations"],
            CheckKind::ParallelSafety => &["version", "sequence_number"],
            CheckKind::StateUpdateFirst => &["balance::split", "balance::decrease_supply"],
            CheckKind::FieldExistence => &[
                "dynamic_field::exists",
                "table::contains",
                "bag::contains",
            ],
            CheckKind::TimeWindowLimit => &["clock::timestamp_ms", "deadline", "expiry"],
        }
    }

    /// Returns true if `context` contains any evidence substring.
    pub fn is_evidenced_in(&self, context: &str) -> bool {
        self.evidence().iter().any(|needle| context.contains(needle))
    }

    /// The kind's name with underscores stripped (`signer_check` -> `signercheck`).
    ///
    /// Used by the call-flow matcher as an extra evidence token.
    pub fn compact_name(&self) -> String {
        self.as_str().replace('_', "")
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_deserializes_from_its_name() {
        for kind in CheckKind::ALL {
            let parsed: CheckKind = serde_json::from_value(serde_json::json!(kind.as_str())).unwrap();
            assert_eq!(parsed, kind);
        }
        assert!(serde_json::from_str::<CheckKind>(r#""nonce_check""#).is_err());
    }

    #[test]
    fn test_aliases() {
        let kinds: Vec<CheckKind> =
            serde_json::from_str(r#"["signer.address", "max_supply", "shift_limit"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                CheckKind::SignerCheck,
                CheckKind::MaxSupplyCheck,
                CheckKind::ShiftLimit
            ]
        );
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in CheckKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_evidence_is_substring_based() {
        assert!(CheckKind::SignerCheck.is_evidenced_in("let s = tx_context::sender(ctx);"));
        assert!(CheckKind::MaxSupplyCheck.is_evidenced_in("c.total_supply + n"));
        assert!(CheckKind::TypeVerification.is_evidenced_in("assert!(ok, 0);"));
        assert!(!CheckKind::SignerCheck.is_evidenced_in("let sender = ctx;"));
        // case-sensitive
        assert!(!CheckKind::MaxSupplyCheck.is_evidenced_in("max_supply_limit"));
    }

    #[test]
    fn test_every_kind_has_evidence() {
        for kind in CheckKind::ALL {
            assert!(!kind.evidence().is_empty(), "{} has no evidence", kind);
        }
    }

    #[test]
    fn test_compact_name() {
        assert_eq!(CheckKind::SignerCheck.compact_name(), "signercheck");
        assert_eq!(CheckKind::GasBudgetLimit.compact_name(), "gasbudgetlimit");
    }
}

//! # Detector Utilities
//!
//! @title Check Evaluation Utilities
//! @author Ramprasad
//!
//! Shared helpers for deciding which declared safety checks lack evidence in
//! a piece of source text, and for the call-flow activation threshold.

use crate::catalog::CheckKind;

/// Lines examined before a function-keyed match.
pub const CONTEXT_LINES_BEFORE: usize = 5;

/// Lines examined after a function-keyed match.
pub const CONTEXT_LINES_AFTER: usize = 10;

/// Fraction of call tokens (in tenths) that must be present: 7/10.
const CALL_FLOW_THRESHOLD_TENTHS: usize = 7;

/// Returns the declared checks with no evidence in `context`, in order.
///
/// # Arguments
///
/// * `checks` - Checks declared by the rule
/// * `context` - Text to search for evidence
///
/// # Example
///
/// ```rust,ignore
/// let missing = missing_checks(&[CheckKind::SignerCheck], "coin::mint(amount)");
/// assert_eq!(missing, vec![CheckKind::SignerCheck]);
/// ```
pub fn missing_checks(checks: &[CheckKind], context: &str) -> Vec<CheckKind> {
    checks
        .iter()
        .copied()
        .filter(|check| !check.is_evidenced_in(context))
        .collect()
}

/// Like [`missing_checks`], but a check also counts as present when the
/// context contains its underscore-free name (e.g. `signercheck`).
pub fn missing_checks_lenient(checks: &[CheckKind], context: &str) -> Vec<CheckKind> {
    checks
        .iter()
        .copied()
        .filter(|check| {
            !check.is_evidenced_in(context) && !context.contains(&check.compact_name())
        })
        .collect()
}

/// Returns true if `found` of `total` call tokens reaches the 70% threshold.
///
/// Evaluated in integers so that `N` tokens activate exactly at
/// `ceil(0.7 * N)`. Zero tokens never activate.
pub fn call_flow_threshold_met(found: usize, total: usize) -> bool {
    total > 0 && found * 10 >= total * CALL_FLOW_THRESHOLD_TENTHS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_checks_preserves_order() {
        let checks = [
            CheckKind::TimeWindowLimit,
            CheckKind::SignerCheck,
            CheckKind::MaxSupplyCheck,
        ];
        let missing = missing_checks(&checks, "assert!(x <= MAX_SUPPLY, 1);");
        assert_eq!(
            missing,
            vec![CheckKind::TimeWindowLimit, CheckKind::SignerCheck]
        );
    }

    #[test]
    fn test_lenient_accepts_compact_name() {
        let checks = [CheckKind::SignerCheck, CheckKind::BlockDelay];
        let missing = missing_checks_lenient(&checks, "call signercheck(ctx);");
        assert_eq!(missing, vec![CheckKind::BlockDelay]);
        assert_eq!(missing_checks(&checks, "call signercheck(ctx);").len(), 2);
    }

    #[test]
    fn test_threshold_law() {
        for total in 1..=20 {
            let needed = (0.7 * total as f64 - 1e-9).ceil() as usize;
            assert!(call_flow_threshold_met(needed, total));
            assert!(!call_flow_threshold_met(needed - 1, total));
        }
        assert!(!call_flow_threshold_met(0, 0));
    }

    #[test]
    fn test_threshold_examples() {
        // 3 of 4 = 75%, 2 of 4 = 50%
        assert!(call_flow_threshold_met(3, 4));
        assert!(!call_flow_threshold_met(2, 4));
        // 7 of 10 is exactly the threshold
        assert!(call_flow_threshold_met(7, 10));
        assert!(!call_flow_threshold_met(6, 10));
    }
}

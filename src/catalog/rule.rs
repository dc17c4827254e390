//! # Threat Rule Model
//!
//! @title Threat Rule Definitions
//! @author Ramprasad
//!
//! Typed form of a catalog entry and the per-rule validation that turns a
//! raw JSON object into a [`ThreatRule`].
//!
//! ## Pattern Shapes
//!
//! | Shape | Keys | Matcher |
//! |-------|------|---------|
//! | Function-keyed | `function_name`, `missing_checks` | line/context |
//! | Call-flow | `function_calls`, `missing_checks` | call-flow |
//! | Other | anything else | none (accepted, never matched) |

use super::CheckKind;
use crate::report::Severity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Sentinel used for absent provenance metadata.
pub const UNKNOWN: &str = "unknown";

/// Minimum length (exclusive) of a rule's recommendation text.
const MIN_RECOMMENDATION_LEN: usize = 5;

/// Minimum length (exclusive) of a rule's fix text.
const MIN_FIX_LEN: usize = 10;

/// Reason a single catalog entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("entry is not a valid rule object: {0}")]
    Malformed(String),

    #[error("rule has an empty id")]
    MissingId,

    #[error("rule id `{0}` has leading or trailing whitespace")]
    InvalidId(String),

    #[error("duplicate rule id `{0}`")]
    DuplicateId(String),

    #[error("rule `{id}` has invalid severity `{value}`")]
    InvalidSeverity { id: String, value: String },

    #[error("rule `{0}` has no pattern object")]
    MissingPattern(String),

    #[error("rule `{id}` has an invalid pattern: {reason}")]
    InvalidPattern { id: String, reason: String },

    #[error("rule `{0}` has an empty description")]
    MissingDescription(String),

    #[error("rule `{id}` field `{field}` must be longer than {min} characters")]
    TextTooShort {
        id: String,
        field: &'static str,
        min: usize,
    },
}

/// What a rule looks for in a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RulePattern {
    /// Matches lines containing `function_name`, checks a context window.
    FunctionKeyed {
        function_name: String,
        missing_checks: Vec<CheckKind>,
    },

    /// Matches when enough `function_calls` tokens occur anywhere in the source.
    CallFlow {
        function_calls: Vec<String>,
        missing_checks: Vec<CheckKind>,
    },

    /// Any other pattern object (loop keywords, resource names, ...).
    Other(Map<String, Value>),
}

impl RulePattern {
    /// Checks declared by the pattern, empty for [`RulePattern::Other`].
    pub fn missing_checks(&self) -> &[CheckKind] {
        match self {
            RulePattern::FunctionKeyed { missing_checks, .. }
            | RulePattern::CallFlow { missing_checks, .. } => missing_checks,
            RulePattern::Other(_) => &[],
        }
    }

    /// Short label for listings.
    pub fn kind_label(&self) -> &'static str {
        match self {
            RulePattern::FunctionKeyed { .. } => "function",
            RulePattern::CallFlow { .. } => "call-flow",
            RulePattern::Other(_) => "other",
        }
    }

    /// Builds a pattern from the raw catalog object.
    fn from_object(id: &str, object: Map<String, Value>) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::InvalidPattern {
            id: id.to_string(),
            reason,
        };

        let has_name = object.contains_key("function_name");
        let has_calls = object.contains_key("function_calls");

        if has_name && has_calls {
            return Err(invalid(
                "declares both `function_name` and `function_calls`".to_string(),
            ));
        }

        if has_name {
            let repr: FunctionPatternRepr =
                serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))?;
            if repr.function_name.is_empty() {
                return Err(invalid("`function_name` is empty".to_string()));
            }
            return Ok(RulePattern::FunctionKeyed {
                function_name: repr.function_name,
                missing_checks: dedup_checks(repr.missing_checks),
            });
        }

        if has_calls {
            let repr: CallFlowPatternRepr =
                serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))?;
            if repr.function_calls.is_empty() {
                return Err(invalid("`function_calls` is empty".to_string()));
            }
            if repr.function_calls.iter().any(|token| token.is_empty()) {
                return Err(invalid("`function_calls` contains an empty token".to_string()));
            }
            return Ok(RulePattern::CallFlow {
                function_calls: repr.function_calls,
                missing_checks: dedup_checks(repr.missing_checks),
            });
        }

        Ok(RulePattern::Other(object))
    }
}

#[derive(Deserialize)]
struct FunctionPatternRepr {
    function_name: String,
    #[serde(default)]
    missing_checks: Vec<CheckKind>,
}

#[derive(Deserialize)]
struct CallFlowPatternRepr {
    function_calls: Vec<String>,
    #[serde(default)]
    missing_checks: Vec<CheckKind>,
}

/// `missing_checks` is a set: drop repeats, keep first-seen order.
fn dedup_checks(checks: Vec<CheckKind>) -> Vec<CheckKind> {
    let mut unique = Vec::with_capacity(checks.len());
    for check in checks {
        if !unique.contains(&check) {
            unique.push(check);
        }
    }
    unique
}

/// Catalog entry as written on disk, before validation.
#[derive(Debug, Deserialize)]
struct RawThreatRule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    severity: Value,
    #[serde(default)]
    pattern: Value,
    #[serde(default)]
    recommendation: String,
    #[serde(default)]
    fix: String,
    exploit_example: Option<String>,
    cve_reference: Option<String>,
}

/// A validated vulnerability signature from the threat catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatRule {
    /// Unique identifier, e.g. `open_mint_function`.
    pub id: String,

    /// Human-readable explanation of the vulnerability.
    pub description: String,

    /// Severity assigned to every finding of this rule.
    pub severity: Severity,

    /// What the rule matches on.
    pub pattern: RulePattern,

    /// Remediation guidance.
    pub recommendation: String,

    /// Concrete fix, usually a code line.
    pub fix: String,

    /// Known exploit using this pattern, or [`UNKNOWN`].
    pub exploit_example: String,

    /// CVE or incident reference, or [`UNKNOWN`].
    pub cve_reference: String,
}

impl ThreatRule {
    /// Parses and validates one catalog entry.
    ///
    /// Duplicate ids are a catalog-level concern and are checked by the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] the entry violates.
    pub fn from_value(value: Value) -> Result<Self, RuleError> {
        let raw: RawThreatRule =
            serde_json::from_value(value).map_err(|e| RuleError::Malformed(e.to_string()))?;

        let id = raw.id;
        if id.trim().is_empty() {
            return Err(RuleError::MissingId);
        }
        if id.trim() != id {
            return Err(RuleError::InvalidId(id));
        }

        let severity = serde_json::from_value::<Severity>(raw.severity.clone())
            .map_err(|_| RuleError::InvalidSeverity {
                id: id.clone(),
                value: raw.severity.to_string(),
            })?;

        let pattern = match raw.pattern {
            Value::Object(object) => RulePattern::from_object(&id, object)?,
            _ => return Err(RuleError::MissingPattern(id)),
        };

        let rule = ThreatRule {
            id,
            description: raw.description,
            severity,
            pattern,
            recommendation: raw.recommendation,
            fix: raw.fix,
            exploit_example: raw.exploit_example.unwrap_or_else(|| UNKNOWN.to_string()),
            cve_reference: raw.cve_reference.unwrap_or_else(|| UNKNOWN.to_string()),
        };

        rule.validate()?;
        Ok(rule)
    }

    /// Checks the text invariants of a rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] for an empty id or description, or remediation
    /// text that is too short to be useful.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.id.trim().is_empty() {
            return Err(RuleError::MissingId);
        }
        if self.id.trim() != self.id {
            return Err(RuleError::InvalidId(self.id.clone()));
        }
        if self.description.trim().is_empty() {
            return Err(RuleError::MissingDescription(self.id.clone()));
        }
        if self.recommendation.trim().chars().count() <= MIN_RECOMMENDATION_LEN {
            return Err(RuleError::TextTooShort {
                id: self.id.clone(),
                field: "recommendation",
                min: MIN_RECOMMENDATION_LEN,
            });
        }
        if self.fix.trim().chars().count() <= MIN_FIX_LEN {
            return Err(RuleError::TextTooShort {
                id: self.id.clone(),
                field: "fix",
                min: MIN_FIX_LEN,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_rule(pattern: Value) -> Value {
        json!({
            "id": "open_mint_function",
            "description": "Mint callable by anyone",
            "severity": "critical",
            "pattern": pattern,
            "recommendation": "Require the admin capability",
            "fix": "assert!(tx_context::sender(ctx) == admin, ENotAdmin);"
        })
    }

    #[test]
    fn test_function_keyed_rule() {
        let rule = ThreatRule::from_value(base_rule(json!({
            "function_name": "mint",
            "missing_checks": ["signer_check", "max_supply"]
        })))
        .unwrap();

        assert_eq!(rule.severity, Severity::Critical);
        assert_eq!(
            rule.pattern,
            RulePattern::FunctionKeyed {
                function_name: "mint".to_string(),
                missing_checks: vec![CheckKind::SignerCheck, CheckKind::MaxSupplyCheck],
            }
        );
        assert_eq!(rule.exploit_example, UNKNOWN);
        assert_eq!(rule.cve_reference, UNKNOWN);
    }

    #[test]
    fn test_call_flow_rule_without_checks() {
        let rule = ThreatRule::from_value(base_rule(json!({
            "function_calls": ["flash_loan", "get_price"]
        })))
        .unwrap();

        assert_eq!(rule.pattern.kind_label(), "call-flow");
        assert!(rule.pattern.missing_checks().is_empty());
    }

    #[test]
    fn test_other_shapes_are_accepted() {
        let rule = ThreatRule::from_value(base_rule(json!({
            "loop_keywords": ["while", "loop"]
        })))
        .unwrap();
        assert!(matches!(rule.pattern, RulePattern::Other(_)));
    }

    #[test]
    fn test_duplicate_checks_collapse() {
        let rule = ThreatRule::from_value(base_rule(json!({
            "function_name": "mint",
            "missing_checks": ["signer_check", "signer.address", "signer_check"]
        })))
        .unwrap();
        assert_eq!(rule.pattern.missing_checks(), &[CheckKind::SignerCheck]);
    }

    #[test]
    fn test_rejections() {
        let mut value = base_rule(json!({ "function_name": "mint" }));
        value["severity"] = json!("info");
        assert!(matches!(
            ThreatRule::from_value(value),
            Err(RuleError::InvalidSeverity { .. })
        ));

        let value = base_rule(Value::Null);
        assert!(matches!(
            ThreatRule::from_value(value),
            Err(RuleError::MissingPattern(_))
        ));

        let value = base_rule(json!({
            "function_name": "mint",
            "missing_checks": ["nonce_check"]
        }));
        assert!(matches!(
            ThreatRule::from_value(value),
            Err(RuleError::InvalidPattern { .. })
        ));

        let value = base_rule(json!({
            "function_name": "mint",
            "function_calls": ["mint"]
        }));
        assert!(matches!(
            ThreatRule::from_value(value),
            Err(RuleError::InvalidPattern { .. })
        ));

        let mut value = base_rule(json!({ "function_name": "mint" }));
        value["fix"] = json!("add check");
        assert!(matches!(
            ThreatRule::from_value(value),
            Err(RuleError::TextTooShort { field: "fix", .. })
        ));

        let mut value = base_rule(json!({ "function_name": "mint" }));
        value["id"] = json!("  ");
        assert_eq!(ThreatRule::from_value(value), Err(RuleError::MissingId));

        let mut value = base_rule(json!({ "function_name": "mint" }));
        value["id"] = json!(" open_mint_function ");
        assert_eq!(
            ThreatRule::from_value(value),
            Err(RuleError::InvalidId(" open_mint_function ".to_string()))
        );

        assert!(matches!(
            ThreatRule::from_value(json!("not an object")),
            Err(RuleError::Malformed(_))
        ));
    }
}

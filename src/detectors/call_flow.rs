//! # M002 - Call-Flow Matcher
//!
//! @title Multi-Step Exploit Shape Matcher
//! @author Ramprasad
//!
//! Matches rules keyed on a sequence of call-site tokens, such as
//! borrow -> price read -> repay. A rule activates when at least 70% of its
//! tokens occur anywhere in the source; helper wrappers and renamed locals
//! routinely hide some of the steps.
//!
//! Tokens and checks are searched in the full source, comments included.
//! A check counts as present if any of its evidence substrings appears, or
//! its name with underscores removed (e.g. `blockdelay`).

use super::utils::{call_flow_threshold_met, missing_checks_lenient};
use super::{create_finding, RuleMatcher};
use crate::catalog::{RulePattern, ThreatRule};
use crate::parser::AnalysisContext;
use crate::report::{Finding, FindingLine};

/// Label used as `function_or_pattern` on call-flow findings.
pub const CALL_PATTERN_LABEL: &str = "Call Pattern";

/// Matcher for `function_calls` rules.
pub struct CallFlowMatcher;

impl CallFlowMatcher {
    /// Counts how many of `tokens` occur in `source`.
    fn count_present(tokens: &[String], source: &str) -> usize {
        tokens
            .iter()
            .filter(|token| source.contains(token.as_str()))
            .count()
    }
}

impl RuleMatcher for CallFlowMatcher {
    fn id(&self) -> &'static str {
        "M002"
    }

    fn name(&self) -> &'static str {
        "Call-Flow Matcher"
    }

    fn description(&self) -> &'static str {
        "Flags sources that contain most of a known exploit call sequence \
         while lacking the checks that neutralize it."
    }

    fn applies_to(&self, rule: &ThreatRule) -> bool {
        matches!(rule.pattern, RulePattern::CallFlow { .. })
    }

    fn match_rule(&self, rule: &ThreatRule, context: &AnalysisContext) -> Vec<Finding> {
        let (calls, checks) = match &rule.pattern {
            RulePattern::CallFlow {
                function_calls,
                missing_checks,
            } => (function_calls, missing_checks),
            RulePattern::FunctionKeyed { .. } | RulePattern::Other(_) => return Vec::new(),
        };

        let source = context.source_code.as_str();
        let found = Self::count_present(calls, source);

        if !call_flow_threshold_met(found, calls.len()) {
            return Vec::new();
        }

        log::debug!(
            "Call pattern `{}` activated: {}/{} tokens present",
            rule.id,
            found,
            calls.len()
        );

        let missing = missing_checks_lenient(checks, source);
        if missing.is_empty() {
            return Vec::new();
        }

        vec![create_finding(
            rule,
            FindingLine::Multiple,
            CALL_PATTERN_LABEL.to_string(),
            calls.join(" + "),
            missing,
        )]
    }
}

/// Evaluates every call-flow rule in `rules` against the source.
pub fn match_call_flow_rules(rules: &[ThreatRule], context: &AnalysisContext) -> Vec<Finding> {
    CallFlowMatcher.match_rules(rules, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CheckKind, ThreatCatalog};

    fn catalog_with(calls: &[&str], checks: &[&str]) -> ThreatCatalog {
        let json = serde_json::json!({
            "threats": [{
                "id": "flash_loan_price_manipulation",
                "description": "Flash loan with spot price",
                "severity": "critical",
                "pattern": { "function_calls": calls, "missing_checks": checks },
                "recommendation": "Use a TWAP price",
                "fix": "assert!(epoch > opened_epoch, ESameEpoch);"
            }]
        });
        ThreatCatalog::from_json(&json.to_string()).unwrap()
    }

    fn run(catalog: &ThreatCatalog, source: &str) -> Vec<Finding> {
        let context = AnalysisContext::from_source("test.move", source);
        match_call_flow_rules(catalog.rules(), &context)
    }

    #[test]
    fn test_activation_emits_single_multiple_finding() {
        let catalog = catalog_with(
            &["flash_loan", "borrow", "get_price", "repay"],
            &["oracle_update_guard", "block_delay"],
        );
        let source = "let (c, r) = flash_loan::borrow(pool, 100);\nlet p = oracle::get_price(feed);\nflash_loan::repay(pool, c, r);";

        let findings = run(&catalog, source);
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.line, FindingLine::Multiple);
        assert_eq!(finding.function_or_pattern, "Call Pattern");
        assert_eq!(finding.snippet, "flash_loan + borrow + get_price + repay");
        assert_eq!(
            finding.missing_checks,
            vec![CheckKind::OracleUpdateGuard, CheckKind::BlockDelay]
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let catalog = catalog_with(&["alpha", "beta", "gamma", "delta"], &["block_delay"]);

        // 3 of 4 tokens: 75%, activates
        assert_eq!(run(&catalog, "alpha beta gamma").len(), 1);
        // 2 of 4 tokens: 50%, stays quiet
        assert!(run(&catalog, "alpha beta").is_empty());
    }

    #[test]
    fn test_comments_count_for_call_flow() {
        let catalog = catalog_with(&["flash_loan", "repay"], &["block_delay"]);
        let findings = run(&catalog, "// flash_loan then repay");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_compact_check_name_counts_as_present() {
        let catalog = catalog_with(&["flash_loan", "repay"], &["block_delay"]);
        assert!(run(&catalog, "flash_loan(); blockdelay(); repay();").is_empty());
        assert!(run(&catalog, "flash_loan(); tx_context::epoch(ctx); repay();").is_empty());
    }

    #[test]
    fn test_activated_rule_without_checks_is_silent() {
        let catalog = catalog_with(&["flash_loan", "repay"], &[]);
        assert!(run(&catalog, "flash_loan(); repay();").is_empty());
    }

    #[test]
    fn test_partial_missing_checks() {
        let catalog = catalog_with(
            &["flash_loan", "repay"],
            &["oracle_update_guard", "block_delay"],
        );
        let findings = run(&catalog, "flash_loan(); repay(); feed.last_update;");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].missing_checks, vec![CheckKind::BlockDelay]);
    }
}

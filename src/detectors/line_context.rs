//! # M001 - Line/Context Matcher
//!
//! @title Function-Keyed Rule Matcher
//! @author Ramprasad
//!
//! Matches rules keyed on a function name. Every non-comment line that
//! contains the name is a match; the declared checks are then looked up in
//! a window of surrounding code.
//!
//! ## Vulnerable Pattern
//!
//! ```move
//! public fun mint(recipient: address, amount: u64, ctx: &mut TxContext) {
//!     let coin = coin::mint(amount);
//!     transfer::public_transfer(coin, recipient);
//! }
//! ```
//!
//! ## Secure Pattern
//!
//! ```move
//! public fun mint(coll: &mut Collection, amount: u64, ctx: &mut TxContext) {
//!     let sender = tx_context::sender(ctx);
//!     assert!(sender == coll.owner, ENotOwner);
//!     assert!(coll.total_supply + amount <= MAX_SUPPLY, EMaxSupply);
//!     ...
//! }
//! ```

use super::utils::{missing_checks, CONTEXT_LINES_AFTER, CONTEXT_LINES_BEFORE};
use super::{create_finding, RuleMatcher};
use crate::catalog::{RulePattern, ThreatRule};
use crate::parser::AnalysisContext;
use crate::report::{Finding, FindingLine};

/// Matcher for `function_name` rules.
pub struct LineContextMatcher;

impl RuleMatcher for LineContextMatcher {
    fn id(&self) -> &'static str {
        "M001"
    }

    fn name(&self) -> &'static str {
        "Line/Context Matcher"
    }

    fn description(&self) -> &'static str {
        "Flags lines that mention a risky function when the surrounding \
         code shows no evidence of the required safety checks."
    }

    fn applies_to(&self, rule: &ThreatRule) -> bool {
        matches!(rule.pattern, RulePattern::FunctionKeyed { .. })
    }

    fn match_rule(&self, rule: &ThreatRule, context: &AnalysisContext) -> Vec<Finding> {
        let (function_name, checks) = match &rule.pattern {
            RulePattern::FunctionKeyed {
                function_name,
                missing_checks,
            } => (function_name, missing_checks),
            RulePattern::CallFlow { .. } | RulePattern::Other(_) => return Vec::new(),
        };

        if checks.is_empty() {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for line in context.code_lines() {
            if !line.text.contains(function_name.as_str()) {
                continue;
            }

            let window =
                context.window_text(line.number - 1, CONTEXT_LINES_BEFORE, CONTEXT_LINES_AFTER);
            let missing = missing_checks(checks, &window);

            if !missing.is_empty() {
                findings.push(create_finding(
                    rule,
                    FindingLine::Line(line.number),
                    function_name.clone(),
                    line.text.trim().to_string(),
                    missing,
                ));
            }
        }

        findings
    }
}

/// Evaluates every function-keyed rule in `rules` against the source.
pub fn match_function_rules(rules: &[ThreatRule], context: &AnalysisContext) -> Vec<Finding> {
    LineContextMatcher.match_rules(rules, context)
}

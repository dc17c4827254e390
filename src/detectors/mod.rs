//! # Threat Matcher Module
//!
//! @title Catalog-Driven Matching Framework
//! @author Ramprasad
//!
//! This module provides the scan engine that evaluates a threat catalog
//! against Move source text, and the matchers that implement each
//! matching strategy.
//!
//! ## Architecture
//!
//! All matchers implement the [`RuleMatcher`] trait. The [`ScanEngine`]
//! walks the catalog in order and hands each rule to the matchers that
//! understand its pattern shape, so findings come out in catalog order,
//! then line order.
//!
//! ## Available Matchers
//!
//! | ID | Name | Pattern shape |
//! |----|------|---------------|
//! | M001 | Line/Context Matcher | `function_name` |
//! | M002 | Call-Flow Matcher | `function_calls` |

mod call_flow;
mod line_context;
pub mod utils;

pub use call_flow::{match_call_flow_rules, CallFlowMatcher};
pub use line_context::{match_function_rules, LineContextMatcher};

use crate::analysis::{self, EconomicRiskReport, MevRiskReport};
use crate::catalog::{CheckKind, ThreatCatalog, ThreatRule};
use crate::parser::AnalysisContext;
use crate::report::{self, AuditReport, Finding, FindingLine, SecurityReport};
use std::sync::Arc;

/// Trait for implementing rule matchers.
///
/// A matcher evaluates one pattern shape. Rules of other shapes must yield
/// no findings.
///
/// # Example Implementation
///
/// ```rust,ignore
/// pub struct MyMatcher;
///
/// impl RuleMatcher for MyMatcher {
///     fn id(&self) -> &'static str { "M999" }
///     fn name(&self) -> &'static str { "My Matcher" }
///     fn description(&self) -> &'static str { "Matches my pattern shape" }
///     fn applies_to(&self, rule: &ThreatRule) -> bool { false }
///
///     fn match_rule(&self, rule: &ThreatRule, context: &AnalysisContext) -> Vec<Finding> {
///         Vec::new()
///     }
/// }
/// ```
pub trait RuleMatcher: Send + Sync {
    /// Returns the unique identifier for this matcher.
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of the matcher.
    fn name(&self) -> &'static str;

    /// Returns a description of the matching strategy.
    fn description(&self) -> &'static str;

    /// Returns true if the rule's pattern shape is handled by this matcher.
    fn applies_to(&self, rule: &ThreatRule) -> bool;

    /// Evaluates one rule against the source.
    ///
    /// # Arguments
    ///
    /// * `rule` - The catalog rule to evaluate
    /// * `context` - The source to scan
    ///
    /// # Returns
    ///
    /// Findings for this rule, in line order.
    fn match_rule(&self, rule: &ThreatRule, context: &AnalysisContext) -> Vec<Finding>;

    /// Evaluates every applicable rule, in slice order.
    fn match_rules(&self, rules: &[ThreatRule], context: &AnalysisContext) -> Vec<Finding> {
        rules
            .iter()
            .filter(|rule| self.applies_to(rule))
            .flat_map(|rule| self.match_rule(rule, context))
            .collect()
    }
}

/// Scanner bound to one threat catalog.
///
/// Every operation is a pure function of the source and the catalog; an
/// engine can be shared across threads and used concurrently.
///
/// # Example
///
/// ```rust,ignore
/// let engine = ScanEngine::new(Arc::new(ThreatCatalog::builtin()));
/// let report = engine.comprehensive_scan(&source);
/// println!("score: {}", report.security_score);
/// ```
pub struct ScanEngine {
    catalog: Arc<ThreatCatalog>,
    matchers: Vec<Box<dyn RuleMatcher>>,
}

impl ScanEngine {
    /// Creates an engine with all default matchers.
    pub fn new(catalog: Arc<ThreatCatalog>) -> Self {
        let matchers: Vec<Box<dyn RuleMatcher>> =
            vec![Box::new(LineContextMatcher), Box::new(CallFlowMatcher)];

        Self { catalog, matchers }
    }

    /// Returns the catalog this engine scans against.
    pub fn catalog(&self) -> &ThreatCatalog {
        &self.catalog
    }

    /// Returns a reference to all registered matchers.
    pub fn matchers(&self) -> &[Box<dyn RuleMatcher>] {
        &self.matchers
    }

    /// Returns raw findings, without scoring.
    pub fn scan(&self, source: &str) -> Vec<Finding> {
        let context = AnalysisContext::from_source("<input>", source);
        self.scan_context(&context)
    }

    /// Returns raw findings for an already prepared context.
    pub fn scan_context(&self, context: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in self.catalog.rules() {
            for matcher in &self.matchers {
                if matcher.applies_to(rule) {
                    findings.extend(matcher.match_rule(rule, context));
                }
            }
        }

        log::debug!(
            "{}: {} findings from {} rules",
            context.file_path,
            findings.len(),
            self.catalog.len()
        );

        findings
    }

    /// Scans and scores the source.
    pub fn comprehensive_scan(&self, source: &str) -> SecurityReport {
        report::score(self.scan(source))
    }

    /// Economic risk overlay for the source.
    pub fn analyze_economic(&self, source: &str) -> EconomicRiskReport {
        analysis::analyze_economic(source)
    }

    /// MEV risk overlay for the source.
    pub fn analyze_mev(&self, source: &str) -> MevRiskReport {
        analysis::analyze_mev(source)
    }

    /// Full audit: comprehensive scan plus both risk overlays.
    pub fn audit(&self, source: &str) -> AuditReport {
        AuditReport::new(
            self.comprehensive_scan(source),
            self.analyze_economic(source),
            self.analyze_mev(source),
        )
    }
}

/// Helper function to create a finding from a rule.
///
/// # Arguments
///
/// * `rule` - The rule that matched
/// * `line` - Matched line or [`FindingLine::Multiple`]
/// * `function_or_pattern` - Matched function name or pattern label
/// * `snippet` - Source excerpt shown to the user
/// * `missing_checks` - Checks with no evidence, in declaration order
pub fn create_finding(
    rule: &ThreatRule,
    line: FindingLine,
    function_or_pattern: String,
    snippet: String,
    missing_checks: Vec<CheckKind>,
) -> Finding {
    Finding {
        rule_id: rule.id.clone(),
        severity: rule.severity,
        line,
        function_or_pattern,
        snippet,
        missing_checks,
        recommendation: rule.recommendation.clone(),
        fix: rule.fix.clone(),
        exploit_example: rule.exploit_example.clone(),
        cve_reference: rule.cve_reference.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RiskLevel;

    const CATALOG: &str = r#"{
        "threats": [
            {
                "id": "call_rule",
                "description": "call flow",
                "severity": "medium",
                "pattern": { "function_calls": ["flash_loan", "repay"], "missing_checks": ["block_delay"] },
                "recommendation": "Delay actions",
                "fix": "assert!(epoch > opened, E);"
            },
            {
                "id": "mint_rule",
                "description": "open mint",
                "severity": "critical",
                "pattern": { "function_name": "mint", "missing_checks": ["signer_check"] },
                "recommendation": "Check the signer",
                "fix": "assert!(tx_context::sender(ctx) == admin, E);"
            },
            {
                "id": "supply_rule",
                "description": "no cap",
                "severity": "high",
                "pattern": { "function_name": "mint", "missing_checks": ["max_supply_check"] },
                "recommendation": "Cap the supply",
                "fix": "assert!(supply <= MAX_SUPPLY, E);"
            },
            {
                "id": "resource_rule",
                "description": "resource",
                "severity": "critical",
                "pattern": { "resource_name": "AdminCap" },
                "recommendation": "Keep it owned",
                "fix": "transfer::transfer(cap, admin);"
            }
        ]
    }"#;

    fn engine() -> ScanEngine {
        ScanEngine::new(Arc::new(ThreatCatalog::from_json(CATALOG).unwrap()))
    }

    #[test]
    fn test_findings_follow_catalog_order() {
        let source = "public fun mint(ctx: &mut TxContext) {}\nflash_loan(); repay(); AdminCap";
        let findings = engine().scan(source);

        let ids: Vec<_> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["call_rule", "mint_rule", "supply_rule"]);
        assert_eq!(findings[0].line, FindingLine::Multiple);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let engine = engine();
        let source = "fun mint() {}\nfun mint_more() {}\n";
        assert_eq!(engine.scan(source), engine.scan(source));
    }

    #[test]
    fn test_empty_catalog_finds_nothing() {
        let engine = ScanEngine::new(Arc::new(ThreatCatalog::empty()));
        let report = engine.comprehensive_scan("public fun mint() { coin::mint(1); }");
        assert!(report.findings.is_empty());
        assert!(report.deployment_ready);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.security_score, 100);
    }

    #[test]
    fn test_comprehensive_scan_scores_findings() {
        let report = engine().comprehensive_scan("public fun mint() {}");
        assert_eq!(report.critical_issues, 1);
        assert_eq!(report.high_issues, 1);
        assert_eq!(report.security_score, 40);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert!(!report.deployment_ready);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let engine = Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.scan("fun mint() {}").len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }

    #[test]
    fn test_matcher_ids_unique() {
        let engine = engine();
        let mut ids: Vec<_> = engine.matchers().iter().map(|m| m.id()).collect();
        let len_before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len_before, "Matcher IDs must be unique");
    }
}

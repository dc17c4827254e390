//! # Report Generation Module
//!
//! @title Security Report and Scorer
//! @author Ramprasad
//!
//! Aggregates findings into a scored security report, and generates output
//! in terminal, Markdown and JSON form.
//!
//! ## Scoring
//!
//! `score = max(0, 100 - 40 * critical - 20 * high - 10 * medium)`. Low
//! findings are counted but do not lower the score.
//!
//! | Risk level | Condition (first match wins) |
//! |------------|------------------------------|
//! | CRITICAL | any critical finding |
//! | HIGH | more than 2 high findings |
//! | MEDIUM | more than 3 medium findings |
//! | LOW | otherwise |
//!
//! ## Key Types
//!
//! - [`SecurityReport`] - Scored findings for one source
//! - [`ScanRun`] - Reports for every file of a CLI scan
//! - [`AuditReport`] - Security report plus economic and MEV overlays
//! - [`Finding`] - Individual rule match
//! - [`Severity`] - Severity classification for findings

mod audit;
mod finding;
mod formatter;
mod templates;

pub use audit::AuditReport;
pub use finding::{Finding, FindingLine, Severity, MULTIPLE_LINES};
pub use formatter::*;

use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};

/// Points deducted per critical finding.
pub const CRITICAL_PENALTY: u32 = 40;

/// Points deducted per high finding.
pub const HIGH_PENALTY: u32 = 20;

/// Points deducted per medium finding.
pub const MEDIUM_PENALTY: u32 = 10;

/// Score of a source with no scored findings.
pub const MAX_SCORE: u32 = 100;

/// Categorical risk classification.
///
/// Ordered from lowest to highest so levels can be combined with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Returns a colored label for terminal output.
    pub fn colored_label(&self) -> ColoredString {
        match self {
            RiskLevel::Critical => "CRITICAL".red().bold(),
            RiskLevel::High => "HIGH".yellow().bold(),
            RiskLevel::Medium => "MEDIUM".blue().bold(),
            RiskLevel::Low => "LOW".green().bold(),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Critical => write!(f, "CRITICAL"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::Low => write!(f, "LOW"),
        }
    }
}

/// Scored findings for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    /// All findings, in catalog then line order.
    pub findings: Vec<Finding>,

    /// Count of critical severity findings.
    pub critical_issues: usize,

    /// Count of high severity findings.
    pub high_issues: usize,

    /// Count of medium severity findings.
    pub medium_issues: usize,

    /// Count of low severity findings.
    pub low_issues: usize,

    /// Total count of all findings.
    pub total_issues: usize,

    /// Weighted score in `[0, 100]`.
    pub security_score: u32,

    /// Overall risk classification.
    pub risk_level: RiskLevel,

    /// No critical and at most one high finding.
    pub deployment_ready: bool,
}

/// Aggregates findings into a [`SecurityReport`].
///
/// # Arguments
///
/// * `findings` - Raw findings from a scan
///
/// # Returns
///
/// The report with counts, score, risk level and deployment verdict.
pub fn score(findings: Vec<Finding>) -> SecurityReport {
    let (mut critical, mut high, mut medium, mut low) = (0usize, 0usize, 0usize, 0usize);

    for finding in &findings {
        match finding.severity {
            Severity::Critical => critical += 1,
            Severity::High => high += 1,
            Severity::Medium => medium += 1,
            Severity::Low => low += 1,
        }
    }

    let penalty = (critical as u64) * CRITICAL_PENALTY as u64
        + (high as u64) * HIGH_PENALTY as u64
        + (medium as u64) * MEDIUM_PENALTY as u64;
    let security_score = (MAX_SCORE as u64).saturating_sub(penalty) as u32;

    let risk_level = if critical > 0 {
        RiskLevel::Critical
    } else if high > 2 {
        RiskLevel::High
    } else if medium > 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    SecurityReport {
        total_issues: findings.len(),
        findings,
        critical_issues: critical,
        high_issues: high,
        medium_issues: medium,
        low_issues: low,
        security_score,
        risk_level,
        deployment_ready: critical == 0 && high <= 1,
    }
}

impl SecurityReport {
    /// Findings of exactly the given severity.
    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Prints colorized findings to the terminal.
    pub fn print_terminal(&self, file_path: &str) {
        if self.findings.is_empty() {
            println!(
                "\n{} {}",
                "[+] No threats found in".green().bold(),
                file_path.blue()
            );
            return;
        }

        println!(
            "\n{} {}",
            "[!] Security Findings:".red().bold(),
            file_path.blue()
        );
        println!("{}", "=".repeat(60).cyan());

        for (i, finding) in self.findings.iter().enumerate() {
            finding.print_terminal(i + 1, file_path);
        }
    }

    /// Prints summary statistics to the terminal.
    pub fn print_summary(&self) {
        println!(
            "{}",
            format!(
                "[*] Summary: {} Critical | {} High | {} Medium | {} Low",
                self.critical_issues, self.high_issues, self.medium_issues, self.low_issues
            )
            .bold()
        );

        println!(
            "[*] Security score: {}/100 | Risk: {}",
            self.security_score.to_string().bold(),
            self.risk_level.colored_label()
        );

        if self.deployment_ready {
            println!("{}", "[+] Deployment ready".green().bold());
        } else {
            println!("{}", "[!] Not ready for deployment".red().bold());
        }
    }
}

/// Metadata about a CLI scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Tool version used for the scan.
    pub version: String,

    /// When the scan was performed.
    pub timestamp: DateTime<Utc>,

    /// Path that was scanned.
    pub scanned_path: String,

    /// Number of files analyzed.
    pub files_analyzed: usize,

    /// Number of rules in the catalog used.
    pub rules_loaded: usize,
}

/// Report for a single scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Display path of the file.
    pub path: String,

    /// The file's scored findings.
    pub report: SecurityReport,
}

/// All reports produced by one CLI scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRun {
    /// Metadata about the scan operation.
    pub metadata: ReportMetadata,

    /// Per-file reports, in discovery order.
    pub files: Vec<FileReport>,
}

impl ScanRun {
    /// Creates a run from per-file reports.
    pub fn new(files: Vec<FileReport>, scanned_path: &str, rules_loaded: usize) -> Self {
        let metadata = ReportMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            scanned_path: scanned_path.to_string(),
            files_analyzed: files.len(),
            rules_loaded,
        };

        Self { metadata, files }
    }

    /// Returns true if every file is deployment ready.
    pub fn deployment_ready(&self) -> bool {
        self.files.iter().all(|f| f.report.deployment_ready)
    }

    /// Converts the run to Markdown format.
    ///
    /// # Errors
    ///
    /// Returns an error if the Markdown template fails to render.
    pub fn to_markdown(&self) -> Result<String, handlebars::RenderError> {
        formatter::to_markdown(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CheckKind;

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: format!("{}_rule", severity.as_str()),
            severity,
            line: FindingLine::Line(1),
            function_or_pattern: "mint".to_string(),
            snippet: "fun mint()".to_string(),
            missing_checks: vec![CheckKind::SignerCheck],
            recommendation: "Fix it".to_string(),
            fix: "assert!(ok, 0);".to_string(),
            exploit_example: "unknown".to_string(),
            cve_reference: "unknown".to_string(),
        }
    }

    fn findings(c: usize, h: usize, m: usize, l: usize) -> Vec<Finding> {
        let mut all = Vec::new();
        all.extend((0..c).map(|_| finding(Severity::Critical)));
        all.extend((0..h).map(|_| finding(Severity::High)));
        all.extend((0..m).map(|_| finding(Severity::Medium)));
        all.extend((0..l).map(|_| finding(Severity::Low)));
        all
    }

    #[test]
    fn test_no_findings() {
        let report = score(Vec::new());
        assert_eq!(report.security_score, 100);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(report.deployment_ready);
    }

    #[test]
    fn test_scoring_law() {
        for c in 0..4 {
            for h in 0..5 {
                for m in 0..6 {
                    let report = score(findings(c, h, m, 2));
                    let expected = (100i64 - 40 * c as i64 - 20 * h as i64 - 10 * m as i64).max(0);
                    assert_eq!(report.security_score as i64, expected);
                    assert!(report.security_score <= 100);
                    assert_eq!(report.total_issues, c + h + m + 2);
                    assert_eq!(report.deployment_ready, c == 0 && h <= 1);
                }
            }
        }
    }

    #[test]
    fn test_low_findings_do_not_affect_score() {
        let report = score(findings(0, 0, 0, 9));
        assert_eq!(report.security_score, 100);
        assert_eq!(report.low_issues, 9);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(report.deployment_ready);
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(score(findings(1, 0, 0, 0)).risk_level, RiskLevel::Critical);
        assert_eq!(score(findings(0, 3, 0, 0)).risk_level, RiskLevel::High);
        assert_eq!(score(findings(0, 2, 0, 0)).risk_level, RiskLevel::Low);
        assert_eq!(score(findings(0, 0, 4, 0)).risk_level, RiskLevel::Medium);
        assert_eq!(score(findings(0, 2, 3, 0)).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_deployment_gate() {
        assert!(score(findings(0, 1, 10, 0)).deployment_ready);
        assert!(!score(findings(0, 2, 0, 0)).deployment_ready);
        assert!(!score(findings(1, 0, 0, 0)).deployment_ready);
    }

    #[test]
    fn test_report_json_field_names() {
        let json = serde_json::to_value(score(findings(1, 0, 0, 0))).unwrap();
        assert_eq!(json["criticalIssues"], 1);
        assert_eq!(json["securityScore"], 60);
        assert_eq!(json["riskLevel"], "CRITICAL");
        assert_eq!(json["deploymentReady"], false);
    }

    #[test]
    fn test_scan_run_readiness() {
        let run = ScanRun::new(
            vec![
                FileReport {
                    path: "a.move".to_string(),
                    report: score(Vec::new()),
                },
                FileReport {
                    path: "b.move".to_string(),
                    report: score(findings(1, 0, 0, 0)),
                },
            ],
            "./sources",
            3,
        );
        assert_eq!(run.metadata.files_analyzed, 2);
        assert!(!run.deployment_ready());
    }
}

//! # Report Formatters
//!
//! @title Markdown and CI Output
//! @author Ramprasad
//!
//! Renders a [`ScanRun`] as a Markdown document (via Handlebars) or as
//! GitHub Actions workflow annotations.

use super::templates::MARKDOWN_REPORT_TEMPLATE;
use super::{Finding, ScanRun, Severity};
use crate::catalog::UNKNOWN;
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Serialize)]
struct MarkdownView<'a> {
    version: &'a str,
    scanned_path: &'a str,
    timestamp: String,
    files_analyzed: usize,
    rules_loaded: usize,
    files: Vec<FileView<'a>>,
}

#[derive(Serialize)]
struct FileView<'a> {
    path: &'a str,
    score: u32,
    risk_level: String,
    critical: usize,
    high: usize,
    medium: usize,
    low: usize,
    deployment_ready: bool,
    findings: Vec<FindingView<'a>>,
}

#[derive(Serialize)]
struct FindingView<'a> {
    index: usize,
    badge: &'static str,
    rule_id: &'a str,
    function_or_pattern: &'a str,
    line: String,
    missing: String,
    snippet: &'a str,
    recommendation: &'a str,
    fix: &'a str,
    exploit_example: Option<&'a str>,
    cve_reference: Option<&'a str>,
}

impl<'a> FindingView<'a> {
    fn new(index: usize, finding: &'a Finding) -> Self {
        let known = |value: &'a str| (value != UNKNOWN).then_some(value);

        Self {
            index,
            badge: finding.severity.markdown_badge(),
            rule_id: &finding.rule_id,
            function_or_pattern: &finding.function_or_pattern,
            line: finding.line.to_string(),
            missing: missing_list(finding),
            snippet: &finding.snippet,
            recommendation: &finding.recommendation,
            fix: &finding.fix,
            exploit_example: known(&finding.exploit_example),
            cve_reference: known(&finding.cve_reference),
        }
    }
}

fn missing_list(finding: &Finding) -> String {
    finding
        .missing_checks
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the run as a Markdown document.
///
/// # Errors
///
/// Returns a [`handlebars::RenderError`] if the template fails to render.
pub fn to_markdown(run: &ScanRun) -> Result<String, handlebars::RenderError> {
    let view = MarkdownView {
        version: &run.metadata.version,
        scanned_path: &run.metadata.scanned_path,
        timestamp: run.metadata.timestamp.to_rfc3339(),
        files_analyzed: run.metadata.files_analyzed,
        rules_loaded: run.metadata.rules_loaded,
        files: run
            .files
            .iter()
            .map(|file| FileView {
                path: &file.path,
                score: file.report.security_score,
                risk_level: file.report.risk_level.to_string(),
                critical: file.report.critical_issues,
                high: file.report.high_issues,
                medium: file.report.medium_issues,
                low: file.report.low_issues,
                deployment_ready: file.report.deployment_ready,
                findings: file
                    .report
                    .findings
                    .iter()
                    .enumerate()
                    .map(|(i, f)| FindingView::new(i + 1, f))
                    .collect(),
            })
            .collect(),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.render_template(MARKDOWN_REPORT_TEMPLATE, &view)
}

/// Formats findings as GitHub Actions workflow commands.
///
/// Format: `::error file={path},line={line},title={title}::{message}`.
/// Call-flow findings have no single line and omit the `line` parameter.
pub fn github_annotations(run: &ScanRun) -> Vec<String> {
    let mut annotations = Vec::new();

    for file in &run.files {
        for finding in &file.report.findings {
            let level = match finding.severity {
                Severity::Critical | Severity::High => "error",
                Severity::Medium => "warning",
                Severity::Low => "notice",
            };

            let location = match finding.line.number() {
                Some(n) => format!("file={},line={}", file.path, n),
                None => format!("file={}", file.path),
            };

            annotations.push(format!(
                "::{} {},title={}::{} missing {}",
                level,
                location,
                finding.rule_id,
                finding.function_or_pattern,
                missing_list(finding).replace('`', "")
            ));
        }
    }

    annotations
}

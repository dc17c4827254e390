//! # Finding and Severity Definitions
//!
//! @title Security Finding Data Structures
//! @author Ramprasad
//!
//! Defines the core data structures for representing security findings
//! and their severity classification.

use crate::catalog::CheckKind;
use colored::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker used in place of a line number for whole-source findings.
pub const MULTIPLE_LINES: &str = "multiple";

/// Severity level classification for security findings.
///
/// Ordered from lowest to highest severity. The serialized names are the
/// exact values accepted in a threat catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity, minimal security impact.
    Low = 1,

    /// Medium severity, moderate security impact.
    Medium = 2,

    /// High severity, significant security impact.
    High = 3,

    /// Critical severity, severe security impact.
    Critical = 4,
}

impl Severity {
    /// Parses a severity level from a string, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of severity
    ///
    /// # Returns
    ///
    /// The corresponding `Severity` variant, or `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    /// Returns the catalog spelling of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Returns a colored label for terminal output.
    pub fn colored_label(&self) -> ColoredString {
        match self {
            Severity::Critical => "CRITICAL".white().on_red().bold(),
            Severity::High => "HIGH".black().on_yellow().bold(),
            Severity::Medium => "MEDIUM".white().on_bright_blue().bold(),
            Severity::Low => "LOW".black().on_white().bold(),
        }
    }

    /// Returns a text indicator for the severity.
    pub fn indicator(&self) -> &'static str {
        match self {
            Severity::Critical => "[!!]",
            Severity::High => "[!]",
            Severity::Medium => "[~]",
            Severity::Low => "[-]",
        }
    }

    /// Returns a Markdown badge for the severity.
    pub fn markdown_badge(&self) -> &'static str {
        match self {
            Severity::Critical => {
                "![Critical](https://img.shields.io/badge/severity-CRITICAL-red)"
            }
            Severity::High => "![High](https://img.shields.io/badge/severity-HIGH-orange)",
            Severity::Medium => "![Medium](https://img.shields.io/badge/severity-MEDIUM-yellow)",
            Severity::Low => "![Low](https://img.shields.io/badge/severity-LOW-blue)",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

/// Where a finding was observed.
///
/// Serialized as a bare 1-based line number, or as the string `"multiple"`
/// for call-flow findings that span the whole source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingLine {
    /// A single 1-based source line.
    Line(usize),

    /// The finding is derived from the whole source.
    Multiple,
}

impl FindingLine {
    /// Returns the line number, if the finding points at a single line.
    pub fn number(&self) -> Option<usize> {
        match self {
            FindingLine::Line(n) => Some(*n),
            FindingLine::Multiple => None,
        }
    }
}

impl std::fmt::Display for FindingLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingLine::Line(n) => write!(f, "{}", n),
            FindingLine::Multiple => f.write_str(MULTIPLE_LINES),
        }
    }
}

impl Serialize for FindingLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FindingLine::Line(n) => serializer.serialize_u64(*n as u64),
            FindingLine::Multiple => serializer.serialize_str(MULTIPLE_LINES),
        }
    }
}

impl<'de> Deserialize<'de> for FindingLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Line(usize),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Line(n) => Ok(FindingLine::Line(n)),
            Repr::Marker(marker) if marker == MULTIPLE_LINES => Ok(FindingLine::Multiple),
            Repr::Marker(other) => Err(serde::de::Error::custom(format!(
                "expected a line number or \"{}\", found \"{}\"",
                MULTIPLE_LINES, other
            ))),
        }
    }
}

/// One concrete match of a catalog rule against a source.
///
/// Findings are created fresh for every scan and never mutated afterwards.
/// The JSON shape (camelCase field names) is consumed by editor and HTTP
/// integrations and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// ID of the catalog rule that produced this finding.
    pub rule_id: String,

    /// Severity copied from the rule.
    pub severity: Severity,

    /// Matched line, or `multiple` for call-flow matches.
    pub line: FindingLine,

    /// The rule's function name, or `Call Pattern` for call-flow matches.
    pub function_or_pattern: String,

    /// The trimmed matched line, or the call tokens joined by ` + `.
    pub snippet: String,

    /// Declared checks with no evidence in the examined context.
    pub missing_checks: Vec<CheckKind>,

    /// Remediation guidance from the rule.
    pub recommendation: String,

    /// Concrete fix from the rule.
    pub fix: String,

    /// Known exploit using this pattern, or `unknown`.
    pub exploit_example: String,

    /// CVE or incident reference, or `unknown`.
    pub cve_reference: String,
}

impl Finding {
    /// Prints the finding to terminal with color formatting.
    ///
    /// # Arguments
    ///
    /// * `index` - The finding number for display.
    /// * `file_path` - Path shown in the location line.
    pub fn print_terminal(&self, index: usize, file_path: &str) {
        println!();
        println!(
            "{} {} [{}] {}",
            format!("#{}", index).cyan().bold(),
            self.severity.colored_label(),
            self.rule_id.yellow(),
            self.function_or_pattern.white().bold()
        );

        println!(
            "   {} {}:{}",
            "Location:".dimmed(),
            file_path.blue(),
            self.line.to_string().cyan()
        );

        let missing: Vec<&str> = self.missing_checks.iter().map(|c| c.as_str()).collect();
        println!("   {} {}", "Missing:".dimmed(), missing.join(", ").red());

        println!("\n   {}", "Code:".yellow());
        println!("   {}", self.snippet.bright_white());

        if self.cve_reference != crate::catalog::UNKNOWN {
            println!("   {} {}", "Reference:".dimmed(), self.cve_reference.blue());
        }

        println!("\n   {}", "Recommendation:".green());
        for line in self.recommendation.lines().take(3) {
            println!("   {}", line.green().dimmed());
        }
        println!("   {} {}", "Fix:".green(), self.fix.green().dimmed());

        println!("{}", "-".repeat(60).dimmed());
    }
}

//! # CLI Module
//!
//! @title Command Line Interface
//! @author Ramprasad
//!
//! This module defines the command-line interface for Move-Sentinel using
//! the `clap` derive macros for declarative argument parsing.
//!
//! ## Commands
//!
//! - `scan` - Scan Move modules against the threat catalog
//! - `audit` - Full audit with economic and MEV overlays, as JSON
//! - `rules` - Display the rules of a threat catalog
//! - `validate` - Check a threat catalog file
//! - `init` - Generate a CI workflow
//! - `version` - Show version information

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Environment variable naming a threat catalog file.
pub const CATALOG_ENV: &str = "MOVE_SENTINEL_CATALOG";

/// Move-Sentinel command-line interface.
///
/// A threat-pattern security scanner for Sui Move smart contracts.
#[derive(Parser, Debug)]
#[command(name = "move-sentinel")]
#[command(author)]
#[command(version)]
#[command(about = "Threat-pattern security scanner for Sui Move smart contracts")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for scan reports.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colorized console output.
    Terminal,
    /// Machine-readable JSON.
    Json,
    /// Human-readable Markdown report.
    Markdown,
    /// GitHub Actions annotations.
    Github,
}

/// Available subcommands for the Move-Sentinel CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan Move modules for known threat patterns.
    ///
    /// Exits with status 1 when any scanned file is not deployment ready.
    Scan {
        /// Path to the `.move` file or directory to scan.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output format for the security report.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
        format: OutputFormat,

        /// Threat catalog file. Defaults to the built-in catalog.
        #[arg(short, long, env = CATALOG_ENV)]
        catalog: Option<PathBuf>,

        /// Output directory for the Markdown report.
        ///
        /// If not specified, the report is printed to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum severity level to include in results.
        ///
        /// Valid values: critical, high, medium, low
        #[arg(short, long)]
        severity: Option<String>,

        /// Exclude specific rules from the results.
        ///
        /// Example: --exclude open_mint_function,swap_without_slippage
        #[arg(short = 'x', long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Include only specific rules in the results.
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Glob patterns of files to skip, e.g. `**/tests/**`.
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
    },

    /// Run a full audit and print the combined JSON payload.
    ///
    /// Includes the security report, economic and MEV overlays, and the
    /// `safeToDeploy` verdict for each file.
    Audit {
        /// Path to the `.move` file or directory to audit.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Threat catalog file. Defaults to the built-in catalog.
        #[arg(short, long, env = CATALOG_ENV)]
        catalog: Option<PathBuf>,
    },

    /// List the rules of a threat catalog.
    Rules {
        /// Threat catalog file. Defaults to the built-in catalog.
        #[arg(short, long, env = CATALOG_ENV)]
        catalog: Option<PathBuf>,
    },

    /// Validate a threat catalog file.
    ///
    /// Exits with status 1 if the file cannot be loaded or any rule is
    /// rejected.
    Validate {
        /// Catalog file to check.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate a GitHub Actions workflow that runs the scanner.
    Init,

    /// Print version information.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify that the CLI definition is valid.
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::parse_from([
            "move-sentinel",
            "scan",
            "sources",
            "--format",
            "json",
            "--only",
            "open_mint_function,swap_without_slippage",
        ]);

        match cli.command {
            Commands::Scan {
                path, format, only, ..
            } => {
                assert_eq!(path, PathBuf::from("sources"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(only.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

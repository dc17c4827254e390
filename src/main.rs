//! # Move-Sentinel CLI Entry Point
//!
//! @title Move-Sentinel CLI
//! @author Ramprasad
//!
//! This module provides the main entry point for the Move-Sentinel
//! command-line security scanner.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use move_sentinel::catalog::{CatalogHandle, ThreatCatalog};
use move_sentinel::cli::{Commands, OutputFormat};
use move_sentinel::report::{self, FileReport, ScanRun, Severity};
use move_sentinel::{AnalysisContext, Cli, ScanEngine};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// ASCII art banner displayed at startup.
const BANNER: &str = r#"
  __  __                     ____             _   _            _
 |  \/  | _____   _____     / ___|  ___ _ __ | |_(_)_ __   ___| |
 | |\/| |/ _ \ \ / / _ \____\___ \ / _ \ '_ \| __| | '_ \ / _ \ |
 | |  | | (_) \ V /  __/_____|__) |  __/ | | | |_| | | | |  __/ |
 |_|  |_|\___/ \_/ \___|    |____/ \___|_| |_|\__|_|_| |_|\___|_|

              Sui Move Threat-Pattern Security Scanner
"#;

/// Application entry point.
///
/// Initializes the logging system, parses command-line arguments, and
/// dispatches to the appropriate command handler.
///
/// # Returns
///
/// The process exit code, or an error if any operation fails.
fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            format,
            catalog,
            output,
            severity,
            exclude,
            only,
            ignore,
        } => {
            if format == OutputFormat::Terminal {
                print_banner();
            }
            let filters = FindingFilters::new(severity, exclude, only)?;
            run_scan(&path, format, catalog, output, &filters, &ignore)
        }
        Commands::Audit { path, catalog } => run_audit(&path, catalog),
        Commands::Rules { catalog } => {
            print_banner();
            list_rules(catalog);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { file } => run_validate(&file),
        Commands::Init => {
            print_banner();
            run_init()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!(
                "{} {}",
                "Move-Sentinel version:".green(),
                env!("CARGO_PKG_VERSION").yellow()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_banner() {
    println!("{}", BANNER.cyan().bold());
}

/// Post-scan filters from the command line.
struct FindingFilters {
    min_severity: Option<Severity>,
    exclude: Vec<String>,
    only: Vec<String>,
}

impl FindingFilters {
    fn new(severity: Option<String>, exclude: Vec<String>, only: Vec<String>) -> Result<Self> {
        let min_severity = match severity {
            Some(s) => match Severity::parse(&s) {
                Some(level) => Some(level),
                None => bail!("unknown severity `{}` (expected critical, high, medium or low)", s),
            },
            None => None,
        };

        Ok(Self {
            min_severity,
            exclude: exclude.iter().map(|s| s.to_lowercase()).collect(),
            only: only.iter().map(|s| s.to_lowercase()).collect(),
        })
    }

    /// Logs filter ids that name no rule in the catalog.
    fn warn_unknown(&self, catalog: &ThreatCatalog) {
        for id in self.exclude.iter().chain(&self.only) {
            if catalog.get(id).is_none() {
                log::warn!("Rule filter `{}` does not match any catalog rule", id);
            }
        }
    }

    fn keep(&self, finding: &report::Finding) -> bool {
        let id = finding.rule_id.to_lowercase();

        self.min_severity.map_or(true, |min| finding.severity >= min)
            && !self.exclude.contains(&id)
            && (self.only.is_empty() || self.only.contains(&id))
    }
}

/// Resolves the catalog to scan with: a file when given, else the built-in one.
fn load_catalog(path: Option<PathBuf>) -> Arc<ThreatCatalog> {
    let handle = match path {
        Some(path) => CatalogHandle::open(path),
        None => CatalogHandle::builtin(),
    };

    let catalog = handle.snapshot();
    if catalog.is_empty() {
        log::warn!("Threat catalog has no usable rules; nothing will be reported");
    }
    catalog
}

/// Executes the security scan operation.
///
/// This function orchestrates the complete scanning workflow:
/// 1. Loads the threat catalog
/// 2. Collects Move source files from the specified path
/// 3. Scans and scores each file, applying the CLI filters
/// 4. Prints or writes the report in the requested format
///
/// # Returns
///
/// `ExitCode::FAILURE` if any file is not deployment ready.
fn run_scan(
    path: &Path,
    format: OutputFormat,
    catalog: Option<PathBuf>,
    output: Option<PathBuf>,
    filters: &FindingFilters,
    ignore: &[String],
) -> Result<ExitCode> {
    let engine = ScanEngine::new(load_catalog(catalog));
    filters.warn_unknown(engine.catalog());

    if format == OutputFormat::Terminal {
        println!(
            "{} {} {}",
            "[*] Scanning:".green().bold(),
            path.display().to_string().yellow(),
            format!("({} rules)", engine.catalog().len()).dimmed()
        );
    }

    let files = collect_move_files(path, ignore)?;
    let reports = perform_scan(&engine, path, &files, |finding| filters.keep(finding))?;
    let run = ScanRun::new(reports, &path.display().to_string(), engine.catalog().len());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        OutputFormat::Markdown => {
            let md = run.to_markdown().context("Failed to render Markdown report")?;
            if let Some(ref out_path) = output {
                std::fs::create_dir_all(out_path)?;
                let report_path = out_path.join("security_report.md");
                std::fs::write(&report_path, &md)
                    .with_context(|| format!("Failed to write {}", report_path.display()))?;
                println!(
                    "{} {}",
                    "[+] Report saved to:".green(),
                    report_path.display().to_string().yellow()
                );
            } else {
                println!("{}", md);
            }
        }
        OutputFormat::Github => {
            for annotation in report::github_annotations(&run) {
                println!("{}", annotation);
            }
        }
        OutputFormat::Terminal => {
            if run.files.is_empty() {
                println!("{}", "[!] No Move source files found.".yellow());
            }
            for file in &run.files {
                file.report.print_terminal(&file.path);
                println!("\n{}", "=".repeat(60).cyan());
                file.report.print_summary();
            }
        }
    }

    Ok(if run.deployment_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs the full audit and prints one JSON payload per file.
fn run_audit(path: &Path, catalog: Option<PathBuf>) -> Result<ExitCode> {
    let engine = ScanEngine::new(load_catalog(catalog));
    let files = collect_move_files(path, &[])?;

    let mut audits = Vec::new();
    let mut all_safe = true;

    for file in &files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Failed to read {}: {}", file.display(), e);
                continue;
            }
        };

        let audit = engine.audit(&source);
        all_safe &= audit.safe_to_deploy;
        audits.push(serde_json::json!({
            "path": display_path(file, path),
            "audit": audit,
        }));
    }

    println!("{}", serde_json::to_string_pretty(&audits)?);

    Ok(if all_safe {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Scans every file and returns per-file reports.
///
/// Unreadable files are logged and skipped.
fn perform_scan<F>(
    engine: &ScanEngine,
    root: &Path,
    files: &[PathBuf],
    keep: F,
) -> Result<Vec<FileReport>>
where
    F: Fn(&report::Finding) -> bool,
{
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(files.len());

    for file_path in files {
        pb.set_message(format!(
            "Analyzing {}",
            file_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        match std::fs::read_to_string(file_path) {
            Ok(source) => {
                let display = display_path(file_path, root);
                let context = AnalysisContext::from_source(&display, source);
                let findings = engine
                    .scan_context(&context)
                    .into_iter()
                    .filter(|f| keep(f))
                    .collect();
                reports.push(FileReport {
                    path: display,
                    report: report::score(findings),
                });
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", file_path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(reports)
}

/// Collects Move source files under `path`.
///
/// A file path is returned as-is. Directories are walked recursively,
/// skipping `build/` output and anything matching an ignore glob.
fn collect_move_files(path: &Path, ignore: &[String]) -> Result<Vec<PathBuf>> {
    use walkdir::WalkDir;

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        bail!("path does not exist: {}", path.display());
    }

    let patterns = ignore
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid ignore pattern `{}`", p)))
        .collect::<Result<Vec<_>>>()?;

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == "build"))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "move"))
        .filter(|e| !patterns.iter().any(|p| p.matches_path(e.path())))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    Ok(files)
}

/// Path shown in reports: relative to the scanned directory when possible.
fn display_path(file: &Path, root: &Path) -> String {
    if root.is_file() {
        return file.display().to_string();
    }
    pathdiff::diff_paths(file, root)
        .unwrap_or_else(|| file.to_path_buf())
        .display()
        .to_string()
}

/// Displays all rules of the catalog.
///
/// Prints the ID, severity, pattern shape and description of each rule,
/// followed by any entries rejected during loading.
fn list_rules(catalog: Option<PathBuf>) {
    let catalog = load_catalog(catalog);

    println!("{}", "[*] Threat Catalog Rules:".green().bold());
    println!("{}", "-".repeat(60).cyan());

    for rule in catalog.rules() {
        println!(
            "  {} {} [{}] ({})",
            rule.severity.indicator(),
            rule.id.cyan().bold(),
            rule.severity.colored_label(),
            rule.pattern.kind_label().dimmed()
        );
        println!("     {}", rule.description.dimmed());
        let checks: Vec<&str> = rule
            .pattern
            .missing_checks()
            .iter()
            .map(|c| c.as_str())
            .collect();
        if !checks.is_empty() {
            println!("     requires: {}", checks.join(", ").yellow());
        }
        println!();
    }

    print_rejections(&catalog);
}

fn print_rejections(catalog: &ThreatCatalog) {
    if catalog.rejected().is_empty() {
        return;
    }

    println!("{}", "[!] Rejected catalog entries:".red().bold());
    for rejected in catalog.rejected() {
        println!("  #{} {}", rejected.index, rejected.error.to_string().red());
    }
}

/// Validates a catalog file, failing on unreadable documents or rejected rules.
fn run_validate(file: &Path) -> Result<ExitCode> {
    let catalog = ThreatCatalog::from_path(file)
        .with_context(|| format!("Failed to load catalog {}", file.display()))?;

    println!(
        "{} {} rules accepted, {} rejected",
        "[*] Catalog:".green().bold(),
        catalog.len().to_string().yellow(),
        catalog.rejected().len().to_string().yellow()
    );
    print_rejections(&catalog);

    Ok(if catalog.rejected().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_init() -> Result<()> {
    let workflow_dir = PathBuf::from(".github/workflows");
    let workflow_path = workflow_dir.join("move-sentinel.yml");

    if workflow_path.exists() {
        println!(
            "{}",
            "[!] Workflow file already exists: .github/workflows/move-sentinel.yml".yellow()
        );
        return Ok(());
    }

    std::fs::create_dir_all(&workflow_dir)?;

    let workflow_content = r#"name: Move-Sentinel Security Scan

on:
  pull_request:
    branches: [ "master", "main" ]
  push:
    branches: [ "master", "main" ]

env:
  CARGO_TERM_COLOR: always

jobs:
  security_scan:
    name: Move-Sentinel Scan
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4

      - name: Install Rust
        uses: dtolnay/rust-toolchain@stable

      - name: Install Move-Sentinel
        run: cargo install --git https://github.com/Ramprasad4121/move-sentinel --branch main

      - name: Run Security Scan
        run: move-sentinel scan sources --format github
"#;

    std::fs::write(&workflow_path, workflow_content)?;

    println!(
        "{} {}",
        "[+] Generated GitHub Actions workflow:".green().bold(),
        workflow_path.display().to_string().yellow()
    );
    println!("    Triggers on Push/PR to main/master branches.");
    println!("    Fails the job when a module is not deployment ready.");

    Ok(())
}

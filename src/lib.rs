//! # Move-Sentinel Library
//!
//! @title Move-Sentinel - Threat-Pattern Security Scanner
//! @author Ramprasad
//!
//! A catalog-driven static analysis library for Sui Move smart contracts.
//!
//! This library loads a declarative threat catalog, matches its rules
//! against Move source text, and scores the findings into a deployment
//! verdict, with optional economic and MEV risk overlays.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions and argument parsing
//! - [`catalog`] - Threat catalog loading, validation and hot reload
//! - [`parser`] - Line classification for Move source text
//! - [`detectors`] - Catalog matchers and the scan engine
//! - [`analysis`] - Economic and MEV keyword overlays
//! - [`report`] - Scoring and report generation in multiple formats
//!
//! ## Example
//!
//! ```rust,ignore
//! use move_sentinel::{ScanEngine, ThreatCatalog};
//! use std::sync::Arc;
//!
//! let engine = ScanEngine::new(Arc::new(ThreatCatalog::builtin()));
//! let report = engine.comprehensive_scan(&source);
//! println!("{} ({})", report.security_score, report.risk_level);
//! ```

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod detectors;
pub mod parser;
pub mod report;

pub use analysis::{analyze_economic, analyze_mev};
pub use catalog::{CatalogHandle, ThreatCatalog};
pub use cli::Cli;
pub use detectors::ScanEngine;
pub use parser::AnalysisContext;
pub use report::{AuditReport, Finding, RiskLevel, SecurityReport, Severity};

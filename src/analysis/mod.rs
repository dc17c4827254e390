//! # Analysis Module
//!
//! @title Economic and MEV Risk Overlays
//! @author Ramprasad
//!
//! Catalog-independent heuristic passes that run on the same source as the
//! threat matchers and are composed into the audit report.
//!
//! ## Components
//!
//! - **Economic Risk**: Flash-loan and oracle dependency exposure
//! - **MEV Risk**: Arbitrage and frontrunning exposure with an additive score

pub mod economic;
pub mod mev;

pub use economic::{analyze_economic, EconomicRisk, EconomicRiskReport, EconomicRiskType};
pub use mev::{analyze_mev, MevRisk, MevRiskReport, MevRiskType};

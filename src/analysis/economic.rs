//! # Economic Risk Analyzer
//!
//! @title Flash-Loan and Oracle Risk Overlay
//! @author Ramprasad
//!
//! Keyword heuristic, independent of the threat catalog. Flags sources that
//! touch flash loans or borrowing, and sources that depend on prices or
//! oracles.
//!
//! | Keywords | Risk | Severity |
//! |----------|------|----------|
//! | `flash_`, `borrow` | `flash_loan_risk` | high |
//! | `price`, `oracle` | `oracle_manipulation` | medium |

use crate::report::{RiskLevel, Severity};
use serde::{Deserialize, Serialize};

const FLASH_LOAN_KEYWORDS: [&str; 2] = ["flash_", "borrow"];
const ORACLE_KEYWORDS: [&str; 2] = ["price", "oracle"];

/// Category of an economic risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicRiskType {
    FlashLoanRisk,
    OracleManipulation,
}

/// One economic risk entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicRisk {
    #[serde(rename = "type")]
    pub risk_type: EconomicRiskType,
    pub description: String,
    pub severity: Severity,
}

/// Result of the economic overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicRiskReport {
    pub risks: Vec<EconomicRisk>,
    pub risk_level: RiskLevel,
}

/// Runs the economic overlay over `source`.
///
/// The level is the highest severity seen, never cumulative: a flash-loan
/// hit is `HIGH` regardless of how many oracle hits accompany it.
pub fn analyze_economic(source: &str) -> EconomicRiskReport {
    let mut risks = Vec::new();
    let mut risk_level = RiskLevel::Low;

    if FLASH_LOAN_KEYWORDS.iter().any(|kw| source.contains(kw)) {
        risks.push(EconomicRisk {
            risk_type: EconomicRiskType::FlashLoanRisk,
            description: "Flash loans or borrowing detected; borrowed liquidity can move \
                          prices and balances within a single transaction."
                .to_string(),
            severity: Severity::High,
        });
        risk_level = RiskLevel::High;
    }

    if ORACLE_KEYWORDS.iter().any(|kw| source.contains(kw)) {
        risks.push(EconomicRisk {
            risk_type: EconomicRiskType::OracleManipulation,
            description: "Price or oracle dependency detected; manipulated or stale prices \
                          can misvalue collateral and swaps."
                .to_string(),
            severity: Severity::Medium,
        });
        risk_level = risk_level.max(RiskLevel::Medium);
    }

    EconomicRiskReport { risks, risk_level }
}

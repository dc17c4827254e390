//! # MEV Risk Analyzer
//!
//! @title Arbitrage and Frontrunning Overlay
//! @author Ramprasad
//!
//! Keyword heuristic with an additive score. Swaps and exchanges invite
//! arbitrage and sandwiching; auctions and bids invite frontrunning.

use crate::report::RiskLevel;
use serde::{Deserialize, Serialize};

const ARBITRAGE_KEYWORDS: [&str; 2] = ["swap", "exchange"];
const AUCTION_KEYWORDS: [&str; 2] = ["auction", "bid"];

const ARBITRAGE_SCORE: u32 = 30;
const FRONTRUNNING_SCORE: u32 = 40;

/// Score above which MEV exposure is `HIGH`.
const HIGH_THRESHOLD: u32 = 50;

/// Score above which MEV exposure is `MEDIUM`.
const MEDIUM_THRESHOLD: u32 = 20;

/// Category of an MEV risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MevRiskType {
    ArbitrageOpportunity,
    FrontrunningRisk,
}

/// One MEV risk entry with its mitigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MevRisk {
    #[serde(rename = "type")]
    pub risk_type: MevRiskType,
    pub description: String,
    pub mitigation: String,
}

/// Result of the MEV overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MevRiskReport {
    pub risks: Vec<MevRisk>,
    pub mev_score: u32,
    pub risk_level: RiskLevel,
}

/// Runs the MEV overlay over `source`.
pub fn analyze_mev(source: &str) -> MevRiskReport {
    let mut risks = Vec::new();
    let mut mev_score = 0;

    if ARBITRAGE_KEYWORDS.iter().any(|kw| source.contains(kw)) {
        risks.push(MevRisk {
            risk_type: MevRiskType::ArbitrageOpportunity,
            description: "Swap or exchange logic can be sandwiched or back-run.".to_string(),
            mitigation: "Enforce a minimum output amount and a deadline on every swap."
                .to_string(),
        });
        mev_score += ARBITRAGE_SCORE;
    }

    if AUCTION_KEYWORDS.iter().any(|kw| source.contains(kw)) {
        risks.push(MevRisk {
            risk_type: MevRiskType::FrontrunningRisk,
            description: "Auction bids are visible before execution and can be frontrun."
                .to_string(),
            mitigation: "Use a commit-reveal scheme so bid amounts stay hidden until the \
                         bidding window closes."
                .to_string(),
        });
        mev_score += FRONTRUNNING_SCORE;
    }

    MevRiskReport {
        risks,
        mev_score,
        risk_level: level_for_score(mev_score),
    }
}

fn level_for_score(score: u32) -> RiskLevel {
    if score > HIGH_THRESHOLD {
        RiskLevel::High
    } else if score > MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let report = analyze_mev("");
        assert_eq!(report.mev_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(report.risks.is_empty());
    }

    #[test]
    fn test_auction_bid() {
        let report = analyze_mev("auction::bid(a, coin, clock);");
        assert!(report.mev_score >= 40);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert!(report
            .risks
            .iter()
            .any(|r| r.risk_type == MevRiskType::FrontrunningRisk));
    }

    #[test]
    fn test_scores_are_additive() {
        let report = analyze_mev("pool::swap(); auction::bid();");
        assert_eq!(report.mev_score, 70);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.risks.len(), 2);

        let swap_only = analyze_mev("dex::exchange(a, b)");
        assert_eq!(swap_only.mev_score, 30);
        assert_eq!(swap_only.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(analyze_mev("swap")).unwrap();
        assert_eq!(json["mevScore"], 30);
        assert_eq!(json["riskLevel"], "MEDIUM");
        assert_eq!(json["risks"][0]["type"], "arbitrage_opportunity");
        assert!(json["risks"][0]["mitigation"].is_string());
    }
}

//! # Audit Report
//!
//! @title Combined Audit Payload
//! @author Ramprasad
//!
//! Composes the scored security report with the economic and MEV overlays
//! into the single payload served to integrations.

use super::{Finding, RiskLevel, SecurityReport, Severity};
use crate::analysis::{EconomicRiskReport, MevRiskReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Security, economic and MEV results for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Wall-clock time the audit was composed.
    pub timestamp: DateTime<Utc>,

    /// Scored catalog findings.
    pub security: SecurityReport,

    /// Flash-loan and oracle overlay.
    pub economic: EconomicRiskReport,

    /// Arbitrage and frontrunning overlay.
    pub mev: MevRiskReport,

    /// Deployment ready and economic risk below `HIGH`.
    pub safe_to_deploy: bool,

    /// Critical findings that must be fixed before deployment.
    pub required_fixes: Vec<Finding>,

    /// Medium findings worth addressing.
    pub optimization_suggestions: Vec<Finding>,
}

impl AuditReport {
    /// Composes an audit from its parts, stamped with the current time.
    pub fn new(
        security: SecurityReport,
        economic: EconomicRiskReport,
        mev: MevRiskReport,
    ) -> Self {
        let safe_to_deploy =
            security.deployment_ready && economic.risk_level != RiskLevel::High;
        let required_fixes = security.findings_with(Severity::Critical).cloned().collect();
        let optimization_suggestions = security.findings_with(Severity::Medium).cloned().collect();

        Self {
            timestamp: Utc::now(),
            security,
            economic,
            mev,
            safe_to_deploy,
            required_fixes,
            optimization_suggestions,
        }
    }
}

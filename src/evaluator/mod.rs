pub mod risk_analyzer;

pub use risk_analyzer::{
    calculate_risk_score, filter_by_severity, filter_by_type, format_signal,
    get_critical_signals, get_risk_level, group_by_type, is_high_risk, sort_by_severity,
    RiskAnalyzer,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TokenSeerError;
use crate::signals::Signal;

/// Discrete bucket for a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = TokenSeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(RiskLevel::Safe),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(TokenSeerError::validation_error(format!(
                "Unknown risk level: {}",
                other
            ))),
        }
    }
}

/// Summary of a signal collection as computed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub level: RiskLevel,
    pub high_risk: bool,
    pub signal_count: usize,
    /// Signals at high or critical severity.
    pub critical_count: usize,
}

impl RiskAssessment {
    pub fn from_signals(signals: &[Signal]) -> Self {
        let score = calculate_risk_score(signals);
        Self {
            score,
            level: get_risk_level(score),
            high_risk: is_high_risk(signals),
            signal_count: signals.len(),
            critical_count: get_critical_signals(signals).len(),
        }
    }
}

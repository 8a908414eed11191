use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TokenSeerError;

/// Category of condition a signal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    WhaleMovement,
    LiquidityChange,
    HolderConcentration,
    ContractRisk,
    PriceManipulation,
    RugpullRisk,
    Honeypot,
    MintAuthority,
    SocialSentiment,
    /// Any value the service sends that this crate does not know yet.
    #[serde(other)]
    Unknown,
}

impl SignalType {
    pub const ALL: [SignalType; 9] = [
        SignalType::WhaleMovement,
        SignalType::LiquidityChange,
        SignalType::HolderConcentration,
        SignalType::ContractRisk,
        SignalType::PriceManipulation,
        SignalType::RugpullRisk,
        SignalType::Honeypot,
        SignalType::MintAuthority,
        SignalType::SocialSentiment,
    ];

    /// Multiplier applied to the severity weight when scoring.
    pub const fn risk_factor(self) -> f64 {
        match self {
            SignalType::WhaleMovement => 1.2,
            SignalType::LiquidityChange => 1.5,
            SignalType::HolderConcentration => 1.3,
            SignalType::ContractRisk => 2.0,
            SignalType::PriceManipulation => 1.8,
            SignalType::RugpullRisk => 3.0,
            SignalType::Honeypot => 3.0,
            SignalType::MintAuthority => 2.5,
            SignalType::SocialSentiment => 0.8,
            SignalType::Unknown => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::WhaleMovement => "whale_movement",
            SignalType::LiquidityChange => "liquidity_change",
            SignalType::HolderConcentration => "holder_concentration",
            SignalType::ContractRisk => "contract_risk",
            SignalType::PriceManipulation => "price_manipulation",
            SignalType::RugpullRisk => "rugpull_risk",
            SignalType::Honeypot => "honeypot",
            SignalType::MintAuthority => "mint_authority",
            SignalType::SocialSentiment => "social_sentiment",
            SignalType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = TokenSeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SignalType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| TokenSeerError::validation_error(format!("Unknown signal type: {}", s)))
    }
}

/// Ordered severity: info < low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl SignalSeverity {
    pub const ALL: [SignalSeverity; 5] = [
        SignalSeverity::Info,
        SignalSeverity::Low,
        SignalSeverity::Medium,
        SignalSeverity::High,
        SignalSeverity::Critical,
    ];

    /// Scoring weight. The table is not evenly spaced, so comparisons between
    /// severities go through this rather than variant order.
    pub const fn weight(self) -> u8 {
        match self {
            SignalSeverity::Info => 0,
            SignalSeverity::Low => 1,
            SignalSeverity::Medium => 2,
            SignalSeverity::High => 3,
            SignalSeverity::Critical => 5,
            SignalSeverity::Unknown => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalSeverity::Info => "info",
            SignalSeverity::Low => "low",
            SignalSeverity::Medium => "medium",
            SignalSeverity::High => "high",
            SignalSeverity::Critical => "critical",
            SignalSeverity::Unknown => "unknown",
        }
    }

    /// Upper-cased label used in rendered signals.
    pub fn label(self) -> String {
        self.as_str().to_uppercase()
    }

    /// Glyph shown in front of a rendered signal.
    pub fn indicator(self) -> &'static str {
        match self {
            SignalSeverity::Info => "🔵",
            SignalSeverity::Low => "🟢",
            SignalSeverity::Medium => "🟡",
            SignalSeverity::High => "🟠",
            SignalSeverity::Critical => "🔴",
            SignalSeverity::Unknown => "⚪",
        }
    }
}

impl fmt::Display for SignalSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSeverity {
    type Err = TokenSeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        SignalSeverity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == normalized)
            .ok_or_else(|| TokenSeerError::validation_error(format!("Unknown severity: {}", s)))
    }
}

/// One detected risk or market event for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub severity: SignalSeverity,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl Signal {
    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

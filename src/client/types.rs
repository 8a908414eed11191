use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenSeerError};
use crate::evaluator::RiskLevel;
use crate::signals::{Signal, SignalSeverity, SignalType};

/// Envelope every endpoint wraps its payload in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    /// Unwraps the payload, turning `success: false` into an API error.
    pub fn into_result(self, status: u16) -> Result<T> {
        if !self.success {
            return Err(TokenSeerError::api_error(
                status,
                self.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }

        self.data.ok_or_else(|| {
            TokenSeerError::api_error(status, "response did not include any data")
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub price_usd: f64,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub liquidity_usd: Option<f64>,
    #[serde(default)]
    pub holders: Option<u64>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAnalysis {
    pub address: String,
    pub is_honeypot: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
    #[serde(default)]
    pub lp_locked: Option<bool>,
    #[serde(default)]
    pub lp_locked_percentage: Option<f64>,
    #[serde(default)]
    pub buy_tax: Option<f64>,
    #[serde(default)]
    pub sell_tax: Option<f64>,
    #[serde(default)]
    pub risks: Vec<String>,
}

impl ContractAnalysis {
    /// Flags a caller should not trade through.
    pub fn has_blocking_issue(&self) -> bool {
        self.is_honeypot || !self.mint_authority_revoked || !self.freeze_authority_revoked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holder {
    pub address: String,
    pub balance: f64,
    pub percentage: f64,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderAnalysis {
    pub address: String,
    pub total_holders: u64,
    /// Share of supply held by the ten largest holders, in percent.
    pub top10_percentage: f64,
    #[serde(default)]
    pub holders: Vec<Holder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub token: TokenInfo,
    #[serde(default)]
    pub market: Option<MarketData>,
    #[serde(default)]
    pub security: Option<ContractAnalysis>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    /// Score computed by the service; compare with the local score.
    #[serde(default)]
    pub risk_score: Option<u8>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub alert_severity: Option<SignalSeverity>,
    pub added_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistItem {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_severity: Option<SignalSeverity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_severity: Option<SignalSeverity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<SignalType>,
    #[serde(default)]
    pub min_severity: Option<SignalSeverity>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: i64,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    pub url: String,
    /// Empty means every signal type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SignalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<SignalSeverity>,
}

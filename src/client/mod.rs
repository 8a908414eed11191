pub mod api;
pub mod types;

pub use api::IntelClient;
pub use types::{
    ApiResponse, ContractAnalysis, Holder, HolderAnalysis, MarketData, NewWatchlistItem,
    NewWebhook, TokenAnalysis, TokenInfo, WatchlistItem, WatchlistUpdate, Webhook,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::signals::{Signal, SignalSeverity, SignalType};

/// Filters accepted by the signal endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalQuery {
    pub types: Vec<SignalType>,
    pub min_severity: Option<SignalSeverity>,
    /// Only signals emitted at or after this epoch-millisecond timestamp.
    pub since: Option<i64>,
    pub limit: Option<u32>,
}

impl SignalQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if !self.types.is_empty() {
            let types: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
            pairs.push(("types", types.join(",")));
        }
        if let Some(severity) = self.min_severity {
            pairs.push(("minSeverity", severity.as_str().to_string()));
        }
        if let Some(since) = self.since {
            pairs.push(("since", since.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
    }
}

/// Anything that can produce the signals recorded for a token.
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_signals(&self, address: &str, query: &SignalQuery) -> Result<Vec<Signal>>;
}

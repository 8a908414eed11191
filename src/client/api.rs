use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::{
    ApiResponse, ContractAnalysis, HolderAnalysis, MarketData, NewWatchlistItem, NewWebhook,
    TokenAnalysis, WatchlistItem, WatchlistUpdate, Webhook,
};
use super::{SignalQuery, SignalSource};
use crate::config::Config;
use crate::error::{Result, TokenSeerError};
use crate::signals::Signal;

const USER_AGENT: &str = concat!("tokenseer/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the token intelligence API.
#[derive(Debug, Clone)]
pub struct IntelClient {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl IntelClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| TokenSeerError::config_error("API key contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            warn!("No API key configured, requests will be unauthenticated");
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_token_analysis(&self, address: &str) -> Result<TokenAnalysis> {
        info!("Fetching token analysis for {}", address);
        let path = token_path(address, "analysis")?;
        self.request(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn get_token_signals(&self, address: &str, query: &SignalQuery) -> Result<Vec<Signal>> {
        info!("Fetching signals for {}", address);
        let path = token_path(address, "signals")?;
        self.request(Method::GET, &path, &query.to_query_pairs(), None::<&()>)
            .await
    }

    /// Signals across all tokens, newest first.
    pub async fn get_signal_feed(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        info!("Fetching signal feed");
        self.request(Method::GET, "/v1/signals", &query.to_query_pairs(), None::<&()>)
            .await
    }

    pub async fn get_market_data(&self, address: &str) -> Result<MarketData> {
        info!("Fetching market data for {}", address);
        let path = token_path(address, "market")?;
        self.request(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn get_contract_analysis(&self, address: &str) -> Result<ContractAnalysis> {
        info!("Running contract security check for {}", address);
        let path = token_path(address, "security")?;
        self.request(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn get_holder_analysis(&self, address: &str, limit: Option<u32>) -> Result<HolderAnalysis> {
        info!("Fetching holder analysis for {}", address);
        let path = token_path(address, "holders")?;
        let query: Vec<(&str, String)> = limit.map(|l| ("limit", l.to_string())).into_iter().collect();
        self.request(Method::GET, &path, &query, None::<&()>).await
    }

    pub async fn list_watchlist(&self) -> Result<Vec<WatchlistItem>> {
        self.request(Method::GET, "/v1/watchlist", &[], None::<&()>).await
    }

    pub async fn add_to_watchlist(&self, item: &NewWatchlistItem) -> Result<WatchlistItem> {
        validate_segment(&item.address)?;
        info!("Adding {} to watchlist", item.address);
        self.request(Method::POST, "/v1/watchlist", &[], Some(item)).await
    }

    pub async fn update_watchlist_item(&self, id: &str, update: &WatchlistUpdate) -> Result<WatchlistItem> {
        let id = validate_segment(id)?;
        let path = format!("/v1/watchlist/{}", id);
        self.request(Method::PATCH, &path, &[], Some(update)).await
    }

    pub async fn remove_from_watchlist(&self, id: &str) -> Result<()> {
        let id = validate_segment(id)?;
        info!("Removing watchlist entry {}", id);
        let path = format!("/v1/watchlist/{}", id);
        self.request_empty(Method::DELETE, &path).await
    }

    pub async fn subscribe_webhook(&self, webhook: &NewWebhook) -> Result<Webhook> {
        let url = webhook.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(TokenSeerError::validation_error(format!(
                "Webhook URL must be http(s): {}",
                webhook.url
            )));
        }

        info!("Subscribing webhook {}", url);
        self.request(Method::POST, "/v1/webhooks", &[], Some(webhook)).await
    }

    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        self.request(Method::GET, "/v1/webhooks", &[], None::<&()>).await
    }

    pub async fn delete_webhook(&self, id: &str) -> Result<()> {
        let id = validate_segment(id)?;
        info!("Deleting webhook {}", id);
        let path = format!("/v1/webhooks/{}", id);
        self.request_empty(Method::DELETE, &path).await
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, text) = self.send(method, path, query, body).await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            warn!("Could not decode response from {}: {}", path, e);
            TokenSeerError::from(e)
        })?;

        envelope.into_result(status)
    }

    /// For endpoints whose payload the caller does not need.
    async fn request_empty(&self, method: Method, path: &str) -> Result<()> {
        let (status, text) = self.send(method, path, &[], None::<&()>).await?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let envelope: ApiResponse<serde_json::Value> = serde_json::from_str(&text)?;
        if !envelope.success {
            return Err(TokenSeerError::api_error(
                status,
                envelope.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }

        Ok(())
    }

    /// Sends the request and returns the status with the raw body. Non-2xx
    /// statuses are turned into errors here.
    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(u16, String)>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());

            warn!("{} returned {}: {}", path, status.as_u16(), message);
            return Err(TokenSeerError::api_error(status.as_u16(), message));
        }

        Ok((status.as_u16(), text))
    }

    fn transport_error(&self, e: reqwest::Error) -> TokenSeerError {
        if e.is_timeout() {
            warn!("Request timed out after {}ms", self.timeout_ms);
            TokenSeerError::Timeout(self.timeout_ms)
        } else {
            warn!("Request failed: {}", e);
            TokenSeerError::Http(e)
        }
    }
}

#[async_trait]
impl SignalSource for IntelClient {
    async fn fetch_signals(&self, address: &str, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.get_token_signals(address, query).await
    }
}

fn token_path(address: &str, resource: &str) -> Result<String> {
    let address = validate_segment(address)?;
    Ok(format!("/v1/tokens/{}/{}", address, resource))
}

/// Addresses and ids are interpolated into paths, so reject anything that
/// would change the URL structure.
fn validate_segment(value: &str) -> Result<&str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TokenSeerError::validation_error("Address or id must not be empty"));
    }
    // Dot segments and backslashes are normalized away when the URL is parsed
    if value == "."
        || value == ".."
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#' | '%'))
    {
        return Err(TokenSeerError::validation_error(format!(
            "Invalid address or id: {}",
            value
        )));
    }
    Ok(value)
}

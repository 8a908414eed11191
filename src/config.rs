use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{debug, info};

use crate::error::{Result, TokenSeerError};
use crate::evaluator::RiskLevel;

pub const DEFAULT_BASE_URL: &str = "https://api.tokenseer.io";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,

    // Highest risk level still acceptable to `risk` checks
    pub max_risk_level: RiskLevel,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_risk_level", &self.max_risk_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_risk_level: RiskLevel::Medium,
        }
    }
}

impl Config {
    /// Applies overrides from a variable lookup. Split out from
    /// [`load_config`] so it can run without touching the process environment.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("TOKENSEER_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(api_key.trim().to_string());
        }

        if let Some(base_url) = lookup("TOKENSEER_BASE_URL") {
            let base_url = base_url.trim().trim_end_matches('/').to_string();
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(TokenSeerError::config_error(format!(
                    "TOKENSEER_BASE_URL must start with http:// or https://, got {}",
                    base_url
                )));
            }
            self.base_url = base_url;
        }

        if let Some(timeout) = lookup("TOKENSEER_TIMEOUT_MS") {
            let timeout_ms: u64 = timeout.trim().parse().map_err(|_| {
                TokenSeerError::config_error(format!("Invalid TOKENSEER_TIMEOUT_MS: {}", timeout))
            })?;
            if timeout_ms == 0 {
                return Err(TokenSeerError::config_error("TOKENSEER_TIMEOUT_MS must be positive"));
            }
            self.timeout_ms = timeout_ms;
        }

        if let Some(level) = lookup("TOKENSEER_MAX_RISK_LEVEL") {
            self.max_risk_level = level.parse().map_err(|_| {
                TokenSeerError::config_error(format!("Invalid TOKENSEER_MAX_RISK_LEVEL: {}", level))
            })?;
        }

        Ok(self)
    }
}

pub fn load_config() -> Result<Config> {
    let config = Config::default().apply_overrides(|key| env::var(key).ok())?;

    info!("Using API at {}", config.base_url);
    debug!(
        "Timeout {}ms, max risk level {}, authenticated: {}",
        config.timeout_ms,
        config.max_risk_level,
        config.api_key.is_some()
    );

    Ok(config)
}

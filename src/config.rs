//! Process configuration, read once at startup and shared by reference.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::services::retry::RetryPolicy;

pub const DEFAULT_PORT: u16 = 8002;
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
pub const DEFAULT_QUOTE_API_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_AUDIT_LOG_PATH: &str = "log.jsonl";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-0125-preview";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings for the upstream chat API.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Settings for the upstream quote API.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    pub client_url: String,
    pub quote: QuoteConfig,
    pub chat: ChatConfig,
    pub audit_log_path: PathBuf,
    /// Credential echoed back in analytics responses as `vcJwt`.
    pub response_credential: Option<String>,
    /// Token the credential gate accepts. `None` rejects every gated request.
    pub credential_token: Option<String>,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            &get,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        )?;

        let defaults = RetryPolicy::default();
        let max_attempts: usize = parse_or(&get, "UPSTREAM_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "UPSTREAM_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let min_delay_ms = parse_or(
            &get,
            "UPSTREAM_RETRY_MIN_DELAY_MS",
            defaults.min_delay.as_millis() as u64,
        )?;
        let max_delay_ms = parse_or(
            &get,
            "UPSTREAM_RETRY_MAX_DELAY_MS",
            defaults.max_delay.as_millis() as u64,
        )?;

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string()),
            port,
            client_url: get("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
            quote: QuoteConfig {
                base_url: get("YAHOO_LINK")
                    .unwrap_or_else(|| DEFAULT_QUOTE_API_BASE_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
                retry: RetryPolicy {
                    max_attempts,
                    min_delay: Duration::from_millis(min_delay_ms),
                    max_delay: Duration::from_millis(max_delay_ms),
                },
            },
            chat: ChatConfig {
                api_key: get("OPENAI_API_KEY"),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
            },
            audit_log_path: PathBuf::from(
                get("AUDIT_LOG_PATH").unwrap_or_else(|| DEFAULT_AUDIT_LOG_PATH.to_string()),
            ),
            response_credential: get("VC_JWT"),
            credential_token: get("CREDENTIAL_TOKEN"),
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}

fn parse_or<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}


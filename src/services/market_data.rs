//! Series source interface for historical price data.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::indicators::PriceSeries;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The upstream call failed. `status` is absent when no response arrived.
    #[error("upstream unavailable ({}): {reason}", describe_status(.status))]
    UpstreamUnavailable { status: Option<u16>, reason: String },

    /// The upstream answered but the adjusted-close series is missing.
    #[error("adjusted close series not found in upstream response")]
    DataNotFound,

    #[error("series source failure: {0}")]
    Internal(String),
}

impl SourceError {
    /// Transport failures, rate limiting and upstream 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::UpstreamUnavailable { status: None, .. } => true,
            SourceError::UpstreamUnavailable {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            SourceError::DataNotFound | SourceError::Internal(_) => false,
        }
    }
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("status {}", status),
        None => "no response".to_string(),
    }
}

#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch daily adjusted-close prices for `symbol` between two unix timestamps.
    async fn fetch_adjusted_close(
        &self,
        symbol: &str,
        period1: u64,
        period2: u64,
    ) -> Result<PriceSeries, SourceError>;
}

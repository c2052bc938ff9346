//! HTTP client for the chart API.

use async_trait::async_trait;
use backon::Retryable;
use std::time::Duration;
use tracing::{debug, warn};

use super::messages::ChartEnvelope;
use crate::config::QuoteConfig;
use crate::models::indicators::PriceSeries;
use crate::services::market_data::{SeriesSource, SourceError};
use crate::services::retry::RetryPolicy;

pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl YahooChartClient {
    /// Build a client with the configured timeout and retry policy.
    pub fn new(config: &QuoteConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(config.base_url.clone(), client).with_retry(config.retry))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            retry: RetryPolicy::single_attempt(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), symbol)
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        period1: u64,
        period2: u64,
    ) -> Result<PriceSeries, SourceError> {
        let url = self.chart_url(symbol);
        debug!(symbol = %symbol, period1, period2, "Fetching chart for {}", symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history|split".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::UpstreamUnavailable {
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::UpstreamUnavailable {
                status: None,
                reason: e.to_string(),
            })?;

        let envelope: ChartEnvelope = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Chart body is not a chart payload");
                return Err(SourceError::DataNotFound);
            }
        };

        let entries = envelope
            .into_adjusted_close()
            .ok_or(SourceError::DataNotFound)?;
        let series = PriceSeries::from_upstream(entries);

        debug!(
            symbol = %symbol,
            count = series.len(),
            gaps = series.gap_count(),
            "Fetched {} adjusted closes for {}",
            series.len(),
            symbol
        );
        Ok(series)
    }
}

#[async_trait]
impl SeriesSource for YahooChartClient {
    async fn fetch_adjusted_close(
        &self,
        symbol: &str,
        period1: u64,
        period2: u64,
    ) -> Result<PriceSeries, SourceError> {
        (|| self.fetch_once(symbol, period1, period2))
            .retry(self.retry.backoff())
            .sleep(tokio::time::sleep)
            .when(SourceError::is_transient)
            .notify(|err: &SourceError, delay: Duration| {
                warn!(
                    symbol = %symbol,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Chart fetch failed, retrying"
                );
            })
            .await
    }
}

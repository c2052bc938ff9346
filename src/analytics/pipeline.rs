//! Validate → fetch → compute → audit orchestration for one analytics request.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::error::AnalyticsError;
use super::validation::validate_request;
use crate::audit::{AuditError, Audited, RequestAuditor};
use crate::indicators::{calculate_ema, calculate_macd_default};
use crate::models::audit::AuditRecord;
use crate::models::indicators::{PriceSeries, TrendReport};
use crate::models::request::{IndicatorRequest, StockInfo};
use crate::services::market_data::SeriesSource;

/// Period of the moving average returned next to the MACD series.
pub const MOVING_AVERAGE_PERIOD: u32 = 9;

/// Pipeline stages, in order. A failure in any stage ends the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Computing,
    Auditing,
    Responding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Fetching => "fetching",
            Stage::Computing => "computing",
            Stage::Auditing => "auditing",
            Stage::Responding => "responding",
        };
        f.write_str(name)
    }
}

/// Derive the 9-period EMA and the default MACD from a price series.
pub fn compute_trend(prices: &PriceSeries) -> TrendReport {
    TrendReport {
        moving_average_9_day: calculate_ema(prices.as_slice(), MOVING_AVERAGE_PERIOD),
        macd_values: calculate_macd_default(prices.as_slice()),
    }
}

pub struct AnalyticsPipeline {
    source: Arc<dyn SeriesSource>,
    auditor: Arc<RequestAuditor>,
}

impl AnalyticsPipeline {
    pub fn new(source: Arc<dyn SeriesSource>, auditor: Arc<RequestAuditor>) -> Self {
        Self { source, auditor }
    }

    pub fn auditor(&self) -> &Arc<RequestAuditor> {
        &self.auditor
    }

    /// Run one request. Audit failures are reported in the returned
    /// [`Audited`] and never turn into an error.
    pub async fn run(
        &self,
        info: Option<&StockInfo>,
    ) -> Result<Audited<TrendReport>, AnalyticsError> {
        let request = validate_request(info).map_err(|e| {
            debug!(stage = %Stage::Validating, error = %e, "Rejected analytics request");
            AnalyticsError::from(e)
        })?;

        let prices = self
            .source
            .fetch_adjusted_close(&request.symbol, request.period1, request.period2)
            .await
            .map_err(|e| {
                warn!(
                    stage = %Stage::Fetching,
                    symbol = %request.symbol,
                    error = %e,
                    "Failed to fetch price series for {}",
                    request.symbol
                );
                AnalyticsError::from(e)
            })?;

        debug!(
            stage = %Stage::Computing,
            symbol = %request.symbol,
            count = prices.len(),
            "Computing indicators"
        );
        let report = compute_trend(&prices);

        let audit = self.audit(&request).await;

        info!(
            stage = %Stage::Responding,
            symbol = %request.symbol,
            points = prices.len(),
            audited = audit.is_ok(),
            "Analytics complete for {}",
            request.symbol
        );
        Ok(Audited {
            value: report,
            audit,
        })
    }

    async fn audit(&self, request: &IndicatorRequest) -> Result<AuditRecord, AuditError> {
        let record = AuditRecord::now(request);
        match self.auditor.append(&record).await {
            Ok(()) => Ok(record),
            Err(e) => {
                error!(
                    stage = %Stage::Auditing,
                    symbol = %request.symbol,
                    path = %self.auditor.path().display(),
                    error = %e,
                    "Failed to write audit record"
                );
                Err(e)
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Daily adjusted-close prices in trading-day order.
///
/// Gaps reported by the upstream as `null` are kept in position as `NaN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    pub fn new(prices: Vec<f64>) -> Self {
        Self(prices)
    }

    /// Build a series from upstream entries, mapping missing values to `NaN`.
    pub fn from_upstream(entries: Vec<Option<f64>>) -> Self {
        Self(entries.into_iter().map(|p| p.unwrap_or(f64::NAN)).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries that were missing upstream.
    pub fn gap_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_nan()).count()
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(prices: Vec<f64>) -> Self {
        Self(prices)
    }
}

/// MACD line, signal line and histogram, each aligned index-for-index with the input prices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.macd_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd_line.is_empty()
    }
}

/// Indicators returned by the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    #[serde(rename = "movingAverage9Day")]
    pub moving_average_9_day: Vec<f64>,
    pub macd_values: MacdSeries,
}

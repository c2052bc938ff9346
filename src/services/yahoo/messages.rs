//! Chart API response shapes.
//!
//! Every level is optional so that a partial payload deserializes and the
//! missing piece can be reported as absent data rather than a parse failure.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub chart: Option<Chart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub indicators: Option<ChartIndicators>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Option<Vec<Option<f64>>>,
}

impl ChartEnvelope {
    /// Extract `chart.result[0].indicators.adjclose[0].adjclose`, if present.
    pub fn into_adjusted_close(self) -> Option<Vec<Option<f64>>> {
        self.chart?
            .result?
            .into_iter()
            .next()?
            .indicators?
            .adjclose?
            .into_iter()
            .next()?
            .adjclose
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `info` object of an analytics request, as sent by clients.
///
/// Periods may arrive as JSON strings or numbers; validation normalizes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockInfo {
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub period1: Option<Value>,
    #[serde(default)]
    pub period2: Option<Value>,
}

/// Body of `POST /stock`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockRequest {
    #[serde(default)]
    pub info: Option<StockInfo>,
}

/// A validated analytics request. Only constructed through validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorRequest {
    pub symbol: String,
    pub period1: u64,
    pub period2: u64,
}

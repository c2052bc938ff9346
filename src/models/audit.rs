use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::IndicatorRequest;

/// One logged analytics request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub symbol: String,
    pub period1: u64,
    pub period2: u64,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(request: &IndicatorRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            symbol: request.symbol.clone(),
            period1: request.period1,
            period2: request.period2,
            created_at,
        }
    }

    pub fn now(request: &IndicatorRequest) -> Self {
        Self::new(request, Utc::now())
    }
}

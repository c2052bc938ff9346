//! Analytics failure taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use super::validation::ValidationError;
use crate::services::market_data::SourceError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("stock data not found or incomplete")]
    DataNotFound,

    #[error("upstream unavailable: {reason}")]
    UpstreamUnavailable { status: Option<u16>, reason: String },

    /// Details are for the operator log only.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<SourceError> for AnalyticsError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::UpstreamUnavailable { status, reason } => {
                AnalyticsError::UpstreamUnavailable { status, reason }
            }
            SourceError::DataNotFound => AnalyticsError::DataNotFound,
            SourceError::Internal(detail) => AnalyticsError::Internal(detail),
        }
    }
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::DataNotFound => StatusCode::NOT_FOUND,
            AnalyticsError::UpstreamUnavailable {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AnalyticsError::UpstreamUnavailable { status: None, .. } => StatusCode::BAD_GATEWAY,
            AnalyticsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            AnalyticsError::InvalidInput(_) => "invalid_input",
            AnalyticsError::DataNotFound => "not_found",
            AnalyticsError::UpstreamUnavailable { .. } => "upstream",
            AnalyticsError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AnalyticsError::InvalidInput(e) => json!({ "message": e.to_string() }),
            AnalyticsError::DataNotFound => {
                json!({ "message": "Stock data not found or incomplete" })
            }
            AnalyticsError::UpstreamUnavailable { reason, .. } => json!({
                "message": "Error fetching stock data",
                "details": reason,
            }),
            AnalyticsError::Internal(_) => json!({ "message": "Internal Server Error" }),
        };
        (status, Json(body)).into_response()
    }
}

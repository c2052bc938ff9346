//! Request handlers for the analytics, audit log, chat and greeting endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::http::AppState;
use crate::analytics::AnalyticsError;
use crate::models::indicators::TrendReport;
use crate::models::request::StockRequest;

pub const MAX_CHAT_INPUT_CHARS: usize = 1000;
pub const MAX_GREETING_NAME_CHARS: usize = 50;
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, I couldn't process your request at this time.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockResponse<'a> {
    message: &'static str,
    vc_jwt: Option<&'a str>,
    data: TrendReport,
}

/// `POST /stock`: run the analytics pipeline for one symbol and range.
pub async fn analyze_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable analytics request body");
            StockRequest::default()
        }
    };

    match state.pipeline.run(request.info.as_ref()).await {
        Ok(audited) => {
            if !audited.is_recorded() {
                state.metrics.audit_write_failures_total.inc();
            }
            state
                .metrics
                .analytics_requests_total
                .with_label_values(&["ok"])
                .inc();

            Json(StockResponse {
                message: "Stock data analysis complete",
                vc_jwt: state.config.response_credential.as_deref(),
                data: audited.value,
            })
            .into_response()
        }
        Err(e) => {
            state
                .metrics
                .analytics_requests_total
                .with_label_values(&[e.outcome()])
                .inc();
            if let AnalyticsError::Internal(detail) = &e {
                error!(detail = %detail, "Analytics request failed");
            }
            e.into_response()
        }
    }
}

/// `GET /log`: every audit record in insertion order.
pub async fn fetch_log(State(state): State<AppState>) -> Response {
    match state.auditor.list().await {
        Ok(records) if records.is_empty() => Json(json!({
            "message": "No logs available",
            "data": [],
        }))
        .into_response(),
        Ok(records) => Json(json!({
            "message": "Log data retrieved",
            "data": records,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read audit log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error retrieving log data" })),
            )
                .into_response()
        }
    }
}

/// `DELETE /log`: truncate the audit log.
pub async fn clear_log(State(state): State<AppState>) -> Response {
    match state.auditor.clear().await {
        Ok(()) => {
            info!("Audit log cleared");
            Json(json!({ "message": "Log data cleared successfully" })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to clear audit log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error clearing log data" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

/// `POST /chat`: forward text to the chat collaborator.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let text = match payload {
        Ok(Json(ChatRequest {
            text: Some(Value::String(text)),
        })) if !text.is_empty() => text,
        _ => return bad_request("Missing or invalid input text"),
    };

    if text.chars().count() > MAX_CHAT_INPUT_CHARS {
        return bad_request("Input text exceeds maximum length");
    }

    match state.chat.complete(&text).await {
        Ok(reply) if reply.is_empty() => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to get AI response" })),
        )
            .into_response(),
        Ok(reply) => Json(json!({ "message": "AI Response", "data": reply })).into_response(),
        Err(e) => {
            warn!(error = %e, "Chat completion failed");
            Json(json!({ "message": "AI Response", "data": CHAT_FALLBACK_REPLY })).into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GreetingRequest {
    #[serde(default)]
    pub name: Option<Value>,
}

/// `POST /test`: connectivity check that greets the caller.
pub async fn greet(payload: Result<Json<GreetingRequest>, JsonRejection>) -> Json<Value> {
    let name = payload.ok().and_then(|Json(request)| request.name);
    let name = match name {
        None | Some(Value::Null) | Some(Value::Bool(false)) => "World".to_string(),
        Some(Value::String(s)) if s.is_empty() => "World".to_string(),
        Some(Value::String(s)) => sanitize_name(&s),
        Some(other) => sanitize_name(&other.to_string()),
    };
    Json(json!({ "message": format!("Hello {}", name) }))
}

/// Keep the first 50 characters, then drop anything but ASCII word characters and whitespace.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .take(MAX_GREETING_NAME_CHARS)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}

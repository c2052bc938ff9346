//! Credential gate middleware for protected routes.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use super::http::{AppState, BODY_LIMIT_BYTES};
use crate::services::credentials::is_expired;

pub const MISSING_CREDENTIALS: &str =
    "Machine verification failed: Missing verification credentials";
pub const INVALID_CREDENTIALS: &str = "Machine verification failed: Invalid credentials";
pub const EXPIRED_TIMESTAMP: &str = "Request timeout: Timestamp expired";

/// Credential fields a client may carry in a JSON body.
///
/// Each field is read on its own so a malformed `timestamp` never hides `vcJwt`.
#[derive(Debug, Default)]
struct CredentialEnvelope {
    vc_jwt: Option<String>,
    /// Client clock, unix milliseconds.
    timestamp: Option<f64>,
}

impl CredentialEnvelope {
    fn from_body(bytes: &[u8]) -> Self {
        let Ok(body) = serde_json::from_slice::<Value>(bytes) else {
            return Self::default();
        };

        let vc_jwt = body
            .get("vcJwt")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        let timestamp = match body.get("timestamp") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        // A zero or unreadable timestamp means the client did not send one.
        let timestamp = timestamp.filter(|ms| ms.is_finite() && *ms != 0.0);

        Self { vc_jwt, timestamp }
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject the request with 401 unless it carries an accepted credential.
///
/// The body is buffered so the credential can be read from it and then
/// handed on unchanged.
pub async fn require_credential(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, BODY_LIMIT_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Rejected unreadable request body");
            return reject(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
    };

    let envelope = CredentialEnvelope::from_body(&bytes);
    let token = bearer_token(&parts.headers)
        .map(str::to_owned)
        .or(envelope.vc_jwt)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return reject(StatusCode::UNAUTHORIZED, MISSING_CREDENTIALS);
    };

    if let Some(timestamp) = envelope.timestamp {
        // `as` saturates out-of-range values.
        if is_expired(timestamp as i64, Utc::now().timestamp_millis()) {
            return reject(StatusCode::UNAUTHORIZED, EXPIRED_TIMESTAMP);
        }
    }

    if !state.credentials.verify(&token).await {
        warn!(path = %parts.uri.path(), "Credential verification failed");
        return reject(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

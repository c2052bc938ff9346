//! Unit tests for request helpers

use axum::http::{header, HeaderMap, HeaderValue};
use stockpulse::core::auth::bearer_token;
use stockpulse::core::routes::sanitize_name;
use stockpulse::services::credentials::{is_expired, MAX_REQUEST_AGE_MS};
use stockpulse::services::{CredentialVerifier, StaticTokenVerifier};

#[test]
fn test_sanitize_name() {
    assert_eq!(sanitize_name("Ada Lovelace"), "Ada Lovelace");
    assert_eq!(sanitize_name("<script>alert(1)</script>"), "scriptalert1script");
    assert_eq!(sanitize_name("snake_case"), "snake_case");
    assert_eq!(sanitize_name(&"x".repeat(80)).len(), 50);
}

#[test]
fn test_sanitize_truncates_before_filtering() {
    let raw = format!("{}abc", "!".repeat(50));
    assert_eq!(sanitize_name(&raw), "");
}

#[test]
fn test_bearer_token() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    assert_eq!(bearer_token(&headers), Some("abc.def"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn test_timestamp_expiry() {
    let now = 1_700_000_000_000;
    assert!(!is_expired(now, now));
    assert!(!is_expired(now - MAX_REQUEST_AGE_MS, now));
    assert!(is_expired(now - MAX_REQUEST_AGE_MS - 1, now));
}

#[test]
fn test_timestamp_expiry_at_i64_bounds() {
    let now = 1_700_000_000_000;
    assert!(is_expired(i64::MIN, now));
    assert!(!is_expired(i64::MAX, now));
    assert!(is_expired(0, i64::MAX));
}

#[tokio::test]
async fn test_static_token_verifier() {
    let verifier = StaticTokenVerifier::new(Some("secret-token".to_string()));
    assert!(verifier.verify("secret-token").await);
    assert!(!verifier.verify("secret-tokem").await);
    assert!(!verifier.verify("secret").await);

    let closed = StaticTokenVerifier::new(None);
    assert!(!closed.verify("secret-token").await);
    assert!(!closed.verify("").await);
}

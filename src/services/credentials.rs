//! Credential gate collaborator.

use async_trait::async_trait;

/// Requests whose `timestamp` is older than this are rejected.
pub const MAX_REQUEST_AGE_MS: i64 = 5 * 60 * 1000;

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Whether `token` authorizes the request.
    async fn verify(&self, token: &str) -> bool;
}

/// Accepts exactly one configured token.
pub struct StaticTokenVerifier {
    expected: Option<String>,
}

impl StaticTokenVerifier {
    pub fn new(expected: Option<String>) -> Self {
        Self { expected }
    }
}

#[async_trait]
impl CredentialVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> bool {
        match &self.expected {
            Some(expected) => {
                expected.len() == token.len()
                    && expected
                        .bytes()
                        .zip(token.bytes())
                        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                        == 0
            }
            None => false,
        }
    }
}

/// Whether a client timestamp (unix milliseconds) is too old to accept at `now_ms`.
pub fn is_expired(timestamp_ms: i64, now_ms: i64) -> bool {
    now_ms.saturating_sub(timestamp_ms) > MAX_REQUEST_AGE_MS
}

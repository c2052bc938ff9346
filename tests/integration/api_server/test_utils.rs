//! Test utilities for API server integration tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use stockpulse::config::AppConfig;
use stockpulse::core::http::{create_router, AppState};
use stockpulse::metrics::Metrics;
use stockpulse::models::indicators::PriceSeries;
use stockpulse::services::chat::{ChatCompleter, ChatError};
use stockpulse::services::market_data::{SeriesSource, SourceError};
use stockpulse::services::StaticTokenVerifier;
use uuid::Uuid;

pub const TEST_TOKEN: &str = "test-credential";
pub const ISSUED_VC: &str = "issued-vc-jwt";

/// Series source returning a fixed result and counting calls.
pub struct FakeSource {
    result: Result<PriceSeries, SourceError>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn ok(prices: Vec<f64>) -> Self {
        Self::with_result(Ok(PriceSeries::new(prices)))
    }

    pub fn with_result(result: Result<PriceSeries, SourceError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeriesSource for FakeSource {
    async fn fetch_adjusted_close(
        &self,
        _symbol: &str,
        _period1: u64,
        _period2: u64,
    ) -> Result<PriceSeries, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Chat collaborator with a canned outcome.
pub enum FakeChat {
    Reply(String),
    Fail,
}

#[async_trait]
impl ChatCompleter for FakeChat {
    async fn complete(&self, text: &str) -> Result<String, ChatError> {
        match self {
            FakeChat::Reply(reply) if reply == "echo" => Ok(text.to_string()),
            FakeChat::Reply(reply) => Ok(reply.clone()),
            FakeChat::Fail => Err(ChatError::NoChoices),
        }
    }
}

pub fn sample_prices() -> Vec<f64> {
    (0..40).map(|i| 130.0 + (i as f64 * 0.3).cos() * 2.0).collect()
}

pub fn temp_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("stockpulse-api-{}.jsonl", Uuid::new_v4()))
}

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub source: Arc<FakeSource>,
    pub audit_log: PathBuf,
}

impl TestApiServer {
    pub async fn new() -> Self {
        Self::with_source(FakeSource::ok(sample_prices())).await
    }

    pub async fn with_source(source: FakeSource) -> Self {
        Self::build(source, FakeChat::Reply("echo".to_string()), temp_log_path()).await
    }

    pub async fn with_chat(chat: FakeChat) -> Self {
        Self::build(FakeSource::ok(sample_prices()), chat, temp_log_path()).await
    }

    pub async fn with_audit_log(audit_log: PathBuf) -> Self {
        Self::build(
            FakeSource::ok(sample_prices()),
            FakeChat::Reply("echo".to_string()),
            audit_log,
        )
        .await
    }

    async fn build(source: FakeSource, chat: FakeChat, audit_log: PathBuf) -> Self {
        let log_path = audit_log.to_string_lossy().into_owned();
        let config = AppConfig::from_lookup(|key| match key {
            "AUDIT_LOG_PATH" => Some(log_path.clone()),
            "VC_JWT" => Some(ISSUED_VC.to_string()),
            "CREDENTIAL_TOKEN" => Some(TEST_TOKEN.to_string()),
            _ => None,
        })
        .expect("test config");

        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let source = Arc::new(source);
        let state = AppState::new(
            Arc::new(config),
            metrics.clone(),
            source.clone(),
            Arc::new(chat),
            Arc::new(StaticTokenVerifier::new(Some(TEST_TOKEN.to_string()))),
        );

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            source,
            audit_log,
        }
    }
}

impl Drop for TestApiServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.audit_log);
    }
}

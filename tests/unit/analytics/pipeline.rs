//! Unit tests for the analytics pipeline

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use stockpulse::analytics::{compute_trend, AnalyticsError, AnalyticsPipeline, ValidationError};
use stockpulse::audit::RequestAuditor;
use stockpulse::indicators::{calculate_ema, calculate_macd_default};
use stockpulse::models::indicators::PriceSeries;
use stockpulse::models::request::StockInfo;
use stockpulse::services::market_data::{SeriesSource, SourceError};
use uuid::Uuid;

struct FixedSource {
    result: Result<PriceSeries, SourceError>,
    calls: AtomicUsize,
}

impl FixedSource {
    fn new(result: Result<PriceSeries, SourceError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeriesSource for FixedSource {
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

fn temp_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("stockpulse-pipeline-{}.jsonl", Uuid::new_v4()))
}

fn valid_info() -> StockInfo {
    StockInfo {
        symbol: Some(json!("AAPL")),
        period1: Some(json!("1609459200")),
        period2: Some(json!("1612137600")),
    }
}

fn prices() -> PriceSeries {
    PriceSeries::new((0..30).map(|i| 120.0 + i as f64 * 0.5).collect())
}

#[test]
fn test_compute_trend_uses_ema9_and_default_macd() {
    let series = prices();
    let report = compute_trend(&series);
    assert_eq!(report.moving_average_9_day, calculate_ema(series.as_slice(), 9));
    assert_eq!(report.macd_values, calculate_macd_default(series.as_slice()));
}

#[test]
fn test_compute_trend_empty_series() {
    let report = compute_trend(&PriceSeries::default());
    assert!(report.moving_average_9_day.is_empty());
    assert!(report.macd_values.is_empty());
}

#[test]
fn test_compute_trend_keeps_gaps_in_position() {
    let series = PriceSeries::from_upstream(vec![Some(1.0), None, Some(3.0)]);
    assert_eq!(series.gap_count(), 1);

    let report = compute_trend(&series);
    assert_eq!(report.moving_average_9_day.len(), 3);
    assert_eq!(report.moving_average_9_day[0], 1.0);
    assert!(report.moving_average_9_day[1].is_nan());
    assert!(report.macd_values.histogram[2].is_nan());
}

#[tokio::test]
async fn test_run_success_records_audit() {
    let path = temp_log_path();
    let auditor = Arc::new(RequestAuditor::new(&path));
    let source = FixedSource::new(Ok(prices()));
    let pipeline = AnalyticsPipeline::new(source.clone(), auditor.clone());

    let audited = pipeline.run(Some(&valid_info())).await.expect("pipeline succeeds");

    assert_eq!(source.calls(), 1);
    assert_eq!(audited.value.moving_average_9_day.len(), 30);
    assert_eq!(audited.value.macd_values.len(), 30);

    let record = audited.audit.expect("audit recorded");
    assert_eq!(record.symbol, "AAPL");
    assert_eq!(record.period1, 1_609_459_200);

    let records = auditor.list().await.expect("list");
    assert_eq!(records, vec![record]);

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_invalid_input_never_reaches_source() {
    let auditor = Arc::new(RequestAuditor::new(temp_log_path()));
    let source = FixedSource::new(Ok(prices()));
    let pipeline = AnalyticsPipeline::new(source.clone(), auditor.clone());

    let mut info = valid_info();
    info.symbol = Some(json!("AA PL!"));
    let result = pipeline.run(Some(&info)).await;

    assert!(matches!(
        result,
        Err(AnalyticsError::InvalidInput(ValidationError::InvalidSymbol))
    ));
    assert_eq!(source.calls(), 0);
    assert!(auditor.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_source_failure_is_not_audited() {
    let auditor = Arc::new(RequestAuditor::new(temp_log_path()));
    let source = FixedSource::new(Err(SourceError::DataNotFound));
    let pipeline = AnalyticsPipeline::new(source, auditor.clone());

    let result = pipeline.run(Some(&valid_info())).await;

    assert!(matches!(result, Err(AnalyticsError::DataNotFound)));
    assert!(auditor.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_upstream_failure_keeps_status() {
    let auditor = Arc::new(RequestAuditor::new(temp_log_path()));
    let source = FixedSource::new(Err(SourceError::UpstreamUnavailable {
        status: Some(429),
        reason: "Too Many Requests".to_string(),
    }));
    let pipeline = AnalyticsPipeline::new(source, auditor);

    match pipeline.run(Some(&valid_info())).await {
        Err(AnalyticsError::UpstreamUnavailable { status, reason }) => {
            assert_eq!(status, Some(429));
            assert_eq!(reason, "Too Many Requests");
        }
        other => panic!("unexpected result: {:?}", other.map(|a| a.value)),
    }
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_request() {
    let unwritable = std::env::temp_dir()
        .join(format!("stockpulse-missing-{}", Uuid::new_v4()))
        .join("log.jsonl");
    let auditor = Arc::new(RequestAuditor::new(unwritable));
    let pipeline = AnalyticsPipeline::new(FixedSource::new(Ok(prices())), auditor);

    let audited = pipeline.run(Some(&valid_info())).await.expect("pipeline succeeds");

    assert!(!audited.is_recorded());
    assert!(audited.audit.is_err());
    assert_eq!(audited.value.moving_average_9_day.len(), 30);
}

//! HTTP endpoint server using Axum

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use super::{auth, routes};
use crate::analytics::AnalyticsPipeline;
use crate::audit::RequestAuditor;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::services::{
    ChatCompleter, CredentialVerifier, OpenAiChatClient, SeriesSource, StaticTokenVerifier,
    YahooChartClient,
};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<AnalyticsPipeline>,
    pub auditor: Arc<RequestAuditor>,
    pub chat: Arc<dyn ChatCompleter>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Wire the state from explicit collaborators.
    pub fn new(
        config: Arc<AppConfig>,
        metrics: Arc<Metrics>,
        source: Arc<dyn SeriesSource>,
        chat: Arc<dyn ChatCompleter>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let auditor = Arc::new(RequestAuditor::new(config.audit_log_path.clone()));
        let pipeline = Arc::new(AnalyticsPipeline::new(source, auditor.clone()));
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            config,
            pipeline,
            auditor,
            chat,
            credentials,
        }
    }

    /// Wire the state with the production collaborators described by `config`.
    pub fn from_config(
        config: Arc<AppConfig>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let metrics = Arc::new(Metrics::new().map_err(|e| e.to_string())?);
        let source = Arc::new(YahooChartClient::new(&config.quote)?);

        let chat_client = reqwest::Client::builder()
            .timeout(config.quote.timeout)
            .build()?;
        let chat = Arc::new(OpenAiChatClient::new(&config.chat, chat_client));

        if config.credential_token.is_none() {
            warn!(
                "CREDENTIAL_TOKEN is not set - credential-gated endpoints will reject every request"
            );
        }
        if config.chat.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set - chat requests will fail");
        }
        let credentials = Arc::new(StaticTokenVerifier::new(config.credential_token.clone()));

        Ok(Self::new(config, metrics, source, chat, credentials))
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "stockpulse-api"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Map a handler panic to an opaque 500.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(detail = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal Server Error" })),
    )
        .into_response()
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]);

    match HeaderValue::from_str(client_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!(
                client_url = %client_url,
                error = %e,
                "Invalid CLIENT_URL, cross-origin requests disabled"
            );
            layer
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/stock", post(routes::analyze_stock))
        .route("/chat", post(routes::chat))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_credential,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/test", post(routes::greet))
        .route("/log", get(routes::fetch_log).delete(routes::clear_log))
        .merge(gated)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_XSS_PROTECTION,
                    HeaderValue::from_static("1; mode=block"),
                ))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(cors_layer(&state.config.client_url))
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        )
        .with_state(state)
}

pub async fn start_server(
    config: Arc<AppConfig>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = config.port;
    let state = AppState::from_config(config)?;
    info!(
        audit_log = %state.auditor.path().display(),
        "Audit log at {}",
        state.auditor.path().display()
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::core::orchestrator::{OrchestratorError, OrchestratorStatus, SignalOrchestrator};
use crate::db::{
    seed_default_instruments, SignalRepository, StoreError, DEFAULT_RECENT_LIMIT,
    DEFAULT_STRONG_LIMIT, DEFAULT_STRONG_MIN_STRENGTH, DEFAULT_SYMBOL_LIMIT,
};
use crate::logging::SERVICE_NAME;
use crate::metrics::Metrics;
use crate::models::instrument::{Instrument, InstrumentCategory};
use crate::models::signal::{AnalysisResult, EmittedSignalState, StoredSignal};
use crate::services::telegram::{TelegramNotifier, TelegramStatus};
use crate::signals::engine::AnalysisError;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub orchestrator: Arc<SignalOrchestrator>,
    pub repository: Arc<dyn SignalRepository>,
    pub telegram: Arc<TelegramNotifier>,
}

impl AppState {
    pub fn new(
        metrics: Arc<Metrics>,
        orchestrator: Arc<SignalOrchestrator>,
        telegram: Arc<TelegramNotifier>,
    ) -> Self {
        Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            repository: orchestrator.repository().clone(),
            orchestrator,
            telegram,
        }
    }
}

/// Liveness plus a summary of the analysis loop.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let status = state.orchestrator.status().await;
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": SERVICE_NAME,
        "scheduler_running": status.is_running,
        "cycle_in_progress": status.cycle_in_progress,
        "last_cycle_at": status.last_cycle_at,
    }))
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
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::InstrumentNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::DuplicateInstrument(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn scheduler_status(State(state): State<AppState>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator.status().await)
}

async fn scheduler_signals(State(state): State<AppState>) -> Json<Vec<EmittedSignalState>> {
    Json(state.orchestrator.last_signals().await)
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct StrongQuery {
    min_strength: Option<u8>,
    limit: Option<usize>,
}

/// Most recent persisted signals
async fn list_signals(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<StoredSignal>>, StatusCode> {
    let signals = state
        .repository
        .recent_signals(params.limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load signals");
            store_status(&e)
        })?;
    Ok(Json(signals))
}

async fn strong_signals(
    State(state): State<AppState>,
    Query(params): Query<StrongQuery>,
) -> Result<Json<Vec<StoredSignal>>, StatusCode> {
    let signals = state
        .repository
        .strong_signals(
            params.min_strength.unwrap_or(DEFAULT_STRONG_MIN_STRENGTH),
            params.limit.unwrap_or(DEFAULT_STRONG_LIMIT),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load strong signals");
            store_status(&e)
        })?;
    Ok(Json(signals))
}

async fn signals_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<StoredSignal>>, StatusCode> {
    let signals = state
        .repository
        .signals_by_symbol(&symbol, params.limit.unwrap_or(DEFAULT_SYMBOL_LIMIT))
        .await
        .map_err(|e| {
            error!(error = %e, symbol = %symbol, "Failed to load signals for {}", symbol);
            store_status(&e)
        })?;
    Ok(Json(signals))
}

/// Run the analysis pipeline for one symbol right now
async fn analyze_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<AnalysisResult>, StatusCode> {
    let result = state.orchestrator.analyze_now(&symbol).await.map_err(|e| {
        warn!(error = %e, symbol = %symbol, "On-demand analysis failed for {}", symbol);
        match e {
            OrchestratorError::NoData(_)
            | OrchestratorError::Analysis(AnalysisError::InsufficientData { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            OrchestratorError::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            OrchestratorError::Store(ref e) => store_status(e),
            OrchestratorError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    })?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct InstrumentQuery {
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CreateInstrumentRequest {
    symbol: String,
    display_name: Option<String>,
    category: String,
}

#[derive(Debug, Deserialize)]
struct SetActiveRequest {
    active: bool,
}

async fn list_instruments(
    State(state): State<AppState>,
    Query(params): Query<InstrumentQuery>,
) -> Result<Json<Vec<Instrument>>, StatusCode> {
    let instruments = if params.active.unwrap_or(false) {
        state.repository.get_active_instruments().await
    } else {
        state.repository.get_all_instruments().await
    }
    .map_err(|e| {
        error!(error = %e, "Failed to load instruments");
        store_status(&e)
    })?;
    Ok(Json(instruments))
}

async fn create_instrument(
    State(state): State<AppState>,
    Json(request): Json<CreateInstrumentRequest>,
) -> Result<(StatusCode, Json<Instrument>), StatusCode> {
    let symbol = request.symbol.trim();
    if symbol.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let category =
        InstrumentCategory::parse(&request.category).ok_or(StatusCode::BAD_REQUEST)?;
    let display_name = request.display_name.as_deref().unwrap_or(symbol);

    let instrument = state
        .repository
        .create_instrument(&Instrument::new(symbol, display_name, category))
        .await
        .map_err(|e| {
            error!(error = %e, symbol = %symbol, "Failed to create instrument {}", symbol);
            store_status(&e)
        })?;

    info!(symbol = %instrument.symbol, "Instrument {} created", instrument.symbol);
    Ok((StatusCode::CREATED, Json(instrument)))
}

async fn set_instrument_active(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Instrument>, StatusCode> {
    let instrument = state
        .repository
        .set_instrument_active(id, request.active)
        .await
        .map_err(|e| {
            error!(error = %e, instrument_id = id, "Failed to update instrument");
            store_status(&e)
        })?;
    Ok(Json(instrument))
}

async fn seed_defaults(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let seeded = seed_default_instruments(state.repository.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to seed default instruments");
            store_status(&e)
        })?;
    Ok(Json(json!({ "seeded": seeded })))
}

async fn telegram_status(State(state): State<AppState>) -> Json<TelegramStatus> {
    Json(state.telegram.status())
}

async fn telegram_test(State(state): State<AppState>) -> Json<Value> {
    let success = state.telegram.send_test_notification().await;
    Json(json!({ "success": success }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/scheduler/status", get(scheduler_status))
        .route("/api/scheduler/signals", get(scheduler_signals))
        .route("/api/signals", get(list_signals))
        .route("/api/signals/strong", get(strong_signals))
        .route("/api/signals/{symbol}", get(signals_by_symbol))
        .route("/api/analyze/{symbol}", post(analyze_symbol))
        .route("/api/instruments", get(list_instruments).post(create_instrument))
        .route("/api/instruments/defaults", post(seed_defaults))
        .route("/api/instruments/{id}/active", put(set_instrument_active))
        .route("/api/telegram/status", get(telegram_status))
        .route("/api/telegram/test", post(telegram_test))
        .layer(
            ServiceBuilder::new()
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
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}

//! HTTP API for scoring snapshots, health checks and Prometheus metrics

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use optimizer_lib::{
    observability::{OptimizerMetrics, StructuredLogger},
    scoring::{SqlHealthScore, UnderutilizationThresholds},
    snapshot::{
        CostSnapshot, CostTrendResponse, ResourceSnapshot, SqlHealthSnapshot, StorageSnapshot,
        UnderutilizedResponse, UnderutilizedSnapshot,
    },
    storage::StorageProjection,
    ScoringError, UnderutilizedResourceReport,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub metrics: OptimizerMetrics,
    pub logger: StructuredLogger,
    pub default_thresholds: UnderutilizationThresholds,
}

impl AppState {
    pub fn new(
        metrics: OptimizerMetrics,
        logger: StructuredLogger,
        default_thresholds: UnderutilizationThresholds,
    ) -> Self {
        Self {
            metrics,
            logger,
            default_thresholds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Request failure mapped onto an HTTP status and JSON body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                code: "INTERNAL_ERROR".to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        let code = match err {
            ScoringError::InvalidThreshold { .. }
            | ScoringError::InvalidCostFloor(_)
            | ScoringError::InvalidLookback => "INVALID_THRESHOLDS",
            ScoringError::InvalidParameter { .. } | ScoringError::UsageCategoryMismatch { .. } => {
                "INVALID_REQUEST"
            }
        };
        Self::bad_request(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn reject(state: &AppState, operation: &str, err: ScoringError) -> ApiError {
    state.metrics.inc_invalid_requests();
    state.logger.log_rejected(operation, &err.to_string());
    err.into()
}

async fn underutilized(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<UnderutilizedSnapshot>,
) -> Result<Json<UnderutilizedResponse>, ApiError> {
    let started = Instant::now();
    let response = snapshot
        .evaluate(&state.default_thresholds)
        .map_err(|e| reject(&state, "underutilized", e))?;
    state.metrics.observe_scoring_latency(started.elapsed().as_secs_f64());

    state.metrics.record_reports(&response.reports);
    state
        .logger
        .log_underutilized_reports(&response.reports, response.summary.total_potential_savings);
    Ok(Json(response))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<ResourceSnapshot>,
) -> Result<Json<UnderutilizedResourceReport>, ApiError> {
    let started = Instant::now();
    let report = snapshot
        .evaluate(&state.default_thresholds)
        .map_err(|e| reject(&state, "recommendations", e))?;
    state.metrics.observe_scoring_latency(started.elapsed().as_secs_f64());
    state.metrics.record_reports(std::slice::from_ref(&report));
    Ok(Json(report))
}

async fn sql_health(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<SqlHealthSnapshot>,
) -> Json<SqlHealthScore> {
    let started = Instant::now();
    let score = snapshot.evaluate();
    state.metrics.observe_scoring_latency(started.elapsed().as_secs_f64());
    state.metrics.inc_sql_health_evaluations();
    state.logger.log_sql_health(&score);
    Json(score)
}

async fn cost_trend(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<CostSnapshot>,
) -> Json<CostTrendResponse> {
    let response = snapshot.evaluate();
    state.metrics.record_cost_spikes(&response.spikes);
    for spike in &response.spikes {
        state.logger.log_cost_spike(spike);
    }
    Json(response)
}

async fn storage_projection(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<StorageSnapshot>,
) -> Result<Json<StorageProjection>, ApiError> {
    let projection = snapshot.evaluate(None).ok_or_else(|| {
        ApiError::bad_request(
            "INSUFFICIENT_DATA",
            "storage projection needs at least two samples and a positive capacity",
        )
    })?;
    state.logger.log_storage_projection(&projection);
    Ok(Json(projection))
}

async fn thresholds(State(state): State<Arc<AppState>>) -> Json<UnderutilizationThresholds> {
    Json(state.default_thresholds)
}

async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<Response, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/underutilized", post(underutilized))
        .route("/api/v1/recommendations", post(recommendations))
        .route("/api/v1/sql-health", post(sql_health))
        .route("/api/v1/cost-trend", post(cost_trend))
        .route("/api/v1/storage-projection", post(storage_projection))
        .route("/api/v1/thresholds", get(thresholds))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

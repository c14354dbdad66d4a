//! REST API endpoints for the thermo-service.
//!
//! # Concurrency and Lock Acquisition
//!
//! - **`state.config`** (RwLock): Read lock while a handler resolves its
//!   clamp policy or chart limits. Released before the store is touched.
//! - **`state.store`** (Mutex): Acquired by the aggregation engine for the
//!   whole lookup and insert/widen sequence of one reading, and briefly by
//!   chart queries.
//!
//! ## Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]:
//! `{"status": false, "error": "<message>"}`. Malformed input returns 400,
//! unknown routes 404, and store failures 500.
//!
//! # Example
//!
//! ```ignore
//! use thermo_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, warn};

use thermo_types::{HourBucket, LiveReading, ParseError, parse_reading, validate_reading};

use crate::aggregator::AggregateError;
use crate::state::AppState;

/// Error message returned for an insert without a usable value.
pub const INSERT_HINT: &str = "request must contain a numeric value, e.g. {\"value\": \"19.9\"}";

/// Error message returned when no reading has been recorded yet.
pub const NO_READINGS: &str = "no readings yet";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        // Health
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(health_detailed))
        // Readings
        .route("/api/temp/get", get(get_current))
        .route("/api/temp/insert", post(insert_reading))
        // Chart data
        .route("/api/chart/get", get(get_chart))
        .fallback(not_found)
}

const INDEX_TEXT: &str = "\
thermo-service

POST /api/temp/insert   {\"value\": 21.5}
GET  /api/temp/get      latest reading
GET  /api/chart/get     hourly min/max, ?days=N
GET  /api/health        service status
";

/// Placeholder landing page.
async fn index() -> &'static str {
    INDEX_TEXT
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Detailed health check response with diagnostics.
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Database health status
    pub database: DatabaseHealth,
    /// Whether a reading has been recorded since start
    pub live_reading: bool,
}

/// Database health information.
#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    /// Whether the database is accessible
    pub ok: bool,
    /// Number of hourly buckets stored
    pub bucket_count: Option<u64>,
    /// Error message if database is not ok
    pub error: Option<String>,
}

/// Detailed health endpoint.
///
/// Reports `"degraded"` instead of failing when the database cannot be read.
async fn health_detailed(State(state): State<Arc<AppState>>) -> Json<DetailedHealthResponse> {
    let database = {
        let store = state.store.lock().await;
        match store.count_buckets() {
            Ok(count) => DatabaseHealth {
                ok: true,
                bucket_count: Some(count),
                error: None,
            },
            Err(e) => DatabaseHealth {
                ok: false,
                bucket_count: None,
                error: Some(e.to_string()),
            },
        }
    };

    Json(DetailedHealthResponse {
        status: if database.ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        database,
        live_reading: state.query.current_reading().is_some(),
    })
}

/// Latest reading since process start.
async fn get_current(State(state): State<Arc<AppState>>) -> Result<Json<LiveReading>, AppError> {
    state
        .query
        .current_reading()
        .map(Json)
        .ok_or_else(|| AppError::BadRequest(NO_READINGS.to_string()))
}

/// A reading supplied either as a JSON number or as numeric text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
}

impl ReadingValue {
    /// The finite value carried by this input.
    pub fn parse(&self) -> Result<f64, ParseError> {
        match self {
            ReadingValue::Number(n) => validate_reading(*n),
            ReadingValue::Text(s) => parse_reading(s),
        }
    }
}

/// Body of `POST /api/temp/insert`.
#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub value: Option<ReadingValue>,
}

/// Response to a successful insert.
#[derive(Debug, Serialize)]
pub struct InsertResponse {
    /// The value as stored, after any clamping.
    pub result: f64,
}

fn insert_value(body: &[u8]) -> Result<f64, AppError> {
    let request: InsertRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected insert body: {}", e);
        AppError::BadRequest(INSERT_HINT.to_string())
    })?;

    let value = request
        .value
        .ok_or_else(|| AppError::BadRequest(INSERT_HINT.to_string()))?;

    value.parse().map_err(|e| {
        warn!("Rejected reading: {}", e);
        AppError::BadRequest(INSERT_HINT.to_string())
    })
}

/// Record a new reading observed now.
async fn insert_reading(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<InsertResponse>, AppError> {
    let value = insert_value(&body)?;
    let value = state.config.read().await.readings.apply(value);

    state.engine.record(value, state.clock.now()).await?;

    Ok(Json(InsertResponse { result: value }))
}

/// Query parameters for chart data.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    /// Window length in days; parsed by the handler so malformed values get
    /// the JSON error body.
    pub days: Option<String>,
}

/// One hourly bucket as served to chart clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Bucket start in Unix seconds.
    pub timestamp: i64,
    #[serde(rename = "minValue")]
    pub min_value: f64,
    #[serde(rename = "maxValue")]
    pub max_value: f64,
}

impl From<HourBucket> for ChartPoint {
    fn from(b: HourBucket) -> Self {
        Self {
            timestamp: b.bucket_start.unix_timestamp(),
            min_value: b.min_value,
            max_value: b.max_value,
        }
    }
}

/// Hourly min/max buckets for the last `days` days, oldest first.
async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    let chart = state.config.read().await.chart.clone();

    let days = match query.days.as_deref().map(str::trim) {
        None | Some("") => chart.default_days,
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            AppError::BadRequest(format!("days must be a non-negative integer, got '{}'", raw))
        })?,
    };

    if days > chart.max_days {
        return Err(AppError::BadRequest(format!(
            "days must be at most {}, got {}",
            chart.max_days, days
        )));
    }

    let series = state.query.chart_series(days).await?;
    Ok(Json(series.into_iter().map(ChartPoint::from).collect()))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Store(thermo_store::Error),
    Aggregate(AggregateError),
}

impl From<thermo_store::Error> for AppError {
    fn from(e: thermo_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl From<AggregateError> for AppError {
    fn from(e: AggregateError) -> Self {
        match e {
            AggregateError::InvalidReading(_) => AppError::BadRequest(INSERT_HINT.to_string()),
            other => AppError::Aggregate(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Aggregate(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        let body = serde_json::json!({
            "status": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

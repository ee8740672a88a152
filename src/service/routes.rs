//! Axum routes for the love test service.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{clear_all, ClearReport, RecordStore};
use crate::types::{LoveTestInput, LoveTestRecord, ReviewInput, ReviewRecord};
use crate::validation::{validate_love_test, validate_review, ValidationError};

use super::error::ApiError;
use super::middleware::{record_store_operation, require_admin};
use super::state::ServiceState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Cap on the public review listing.
pub const PUBLIC_REVIEW_LIMIT: usize = 50;

type AppState<S> = Arc<ServiceState<S>>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Successful save of one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

/// Admin login request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Admin login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Full dump of both collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub love_tests: Vec<LoveTestRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub exported_at: DateTime<Utc>,
    pub total_records: usize,
}

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: ExportData,
}

/// Bulk delete request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearRequest {
    pub confirmation: Option<String>,
}

/// Bulk delete response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub deleted: ClearReport,
}

/// Service status at `/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
}

/// Store connectivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub connected: bool,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Run one store call, recording its latency and outcome.
async fn timed<T, E, F>(operation: &'static str, call: F) -> Result<T, ApiError>
where
    E: std::error::Error,
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = call.await;
    record_store_operation(operation, start.elapsed().as_millis() as u64, result.is_ok());
    result.map_err(ApiError::store)
}

/// Service status summary.
async fn health_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    let connected = state.store.ping().await.is_ok();

    Json(HealthResponse {
        success: true,
        message: "Love test API is running".to_string(),
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth { connected },
    })
}

/// Liveness probe endpoint. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint. 503 while the store is unreachable.
async fn readiness_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let connected = state.store.ping().await.is_ok();
    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadinessResponse {
            ready: connected,
            database: connected,
        }),
    )
}

/// Validate and persist a love test.
async fn save_love_test_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<LoveTestInput>, JsonRejection>,
) -> Result<Json<SaveResponse<LoveTestRecord>>, ApiError> {
    let Json(input) = payload?;
    let record = validate_love_test(input)?;
    let stored = timed("create_love_test", state.store.create_love_test(record)).await?;

    tracing::info!(id = %stored.id, score = stored.score, "Love test saved");
    Ok(Json(SaveResponse {
        success: true,
        message: "Love test saved successfully".to_string(),
        data: stored,
    }))
}

/// Validate and persist a review.
async fn save_review_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ReviewInput>, JsonRejection>,
) -> Result<Json<SaveResponse<ReviewRecord>>, ApiError> {
    let Json(input) = payload?;
    let record = validate_review(input)?;
    let stored = timed("create_review", state.store.create_review(record)).await?;

    tracing::info!(id = %stored.id, rating = stored.rating, "Review saved");
    Ok(Json(SaveResponse {
        success: true,
        message: "Review saved successfully".to_string(),
        data: stored,
    }))
}

/// Newest reviews, capped for public consumption.
async fn public_reviews_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    let reviews = timed(
        "list_reviews",
        state.store.list_reviews(Some(PUBLIC_REVIEW_LIMIT)),
    )
    .await?;
    Ok(Json(reviews))
}

/// Exchange the admin credential for a token.
async fn admin_login_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            return Err(ValidationError::InvalidInput(
                "username and password are required".to_string(),
            )
            .into())
        }
    };

    let issued = state.tokens.issue(&username, &password)?;
    tracing::info!(expires_at = %issued.expires_at, "Admin token issued");

    Ok(Json(LoginResponse {
        success: true,
        expires_in: issued.expires_in(),
        token: issued.token,
    }))
}

/// Every love test, newest first.
async fn admin_love_tests_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<LoveTestRecord>>, ApiError> {
    let love_tests = timed("list_love_tests", state.store.list_love_tests()).await?;
    Ok(Json(love_tests))
}

/// Every review, newest first.
async fn admin_reviews_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    let reviews = timed("list_reviews", state.store.list_reviews(None)).await?;
    Ok(Json(reviews))
}

/// Dump both collections.
async fn export_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ExportResponse>, ApiError> {
    let (love_tests, reviews) = tokio::try_join!(
        timed("list_love_tests", state.store.list_love_tests()),
        timed("list_reviews", state.store.list_reviews(None)),
    )?;

    let total_records = love_tests.len() + reviews.len();
    tracing::info!(total_records, "Admin export");

    Ok(Json(ExportResponse {
        success: true,
        data: ExportData {
            love_tests,
            reviews,
            exported_at: Utc::now(),
            total_records,
        },
    }))
}

/// Delete every record of both kinds.
async fn clear_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let confirmation = payload.ok().and_then(|Json(r)| r.confirmation);

    let deleted = clear_all(state.store.as_ref(), confirmation.as_deref()).await?;
    tracing::warn!(
        love_tests = deleted.love_tests,
        reviews = deleted.reviews,
        "All records cleared by admin"
    );

    Ok(Json(ClearResponse {
        success: true,
        message: format!("Deleted {} records", deleted.total()),
        deleted,
    }))
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the love test service.
pub fn create_router<S: RecordStore + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    let admin = Router::new()
        .route("/get-love-tests", get(admin_love_tests_handler::<S>))
        .route("/get-reviews-admin", get(admin_reviews_handler::<S>))
        .route("/admin/export", get(export_handler::<S>))
        .route("/admin/clear", post(clear_handler::<S>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            require_admin,
        ));

    Router::new()
        // Status and probes
        .route("/", get(health_handler::<S>))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler::<S>))
        // Public submissions and listing
        .route("/save-love-test", post(save_love_test_handler::<S>))
        .route("/save-review", post(save_review_handler::<S>))
        .route("/get-reviews", get(public_reviews_handler::<S>))
        .route("/admin-login", post(admin_login_handler::<S>))
        // Bearer-protected admin surface
        .merge(admin)
        // Unknown paths and known paths hit with the wrong method alike
        .method_not_allowed_fallback(not_found_handler)
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

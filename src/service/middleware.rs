//! Service middleware for admin auth, request logging and metrics.
//!
//! ## Metrics Exposed
//!
//! Emitted as structured `info!` events on the `love_test_service::metrics`
//! target so they can be aggregated from logs:
//!
//! - `request` - path, method, status and latency per request
//! - `store_operation` - operation name, outcome and latency
//! - `token_verification` - valid / invalid

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};

use crate::auth::{bearer_token, TokenService};

use super::error::ApiError;

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reject requests without a valid admin bearer token.
///
/// On success the verified [`crate::auth::AdminClaims`] are placed in the
/// request extensions.
pub async fn require_admin(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let result = tokens.verify(bearer_token(header));
    record_token_verification(result.is_ok());

    let claims = result?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Request logging middleware that adds a correlation id and timing.
///
/// Reuses an incoming `X-Request-Id` or generates one, and echoes it on the
/// response.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", latency_ms);

    info!(
        target: "love_test_service::metrics",
        metric_type = "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency_ms,
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Record the outcome of one store call.
pub fn record_store_operation(operation: &'static str, latency_ms: u64, success: bool) {
    let status = if success { "success" } else { "error" };
    info!(
        target: "love_test_service::metrics",
        metric_type = "store_operation",
        operation = operation,
        status = status,
        latency_ms = latency_ms,
        "store_operation_metric"
    );
}

/// Record token verification metrics.
pub fn record_token_verification(valid: bool) {
    let result = if valid { "valid" } else { "invalid" };
    info!(
        target: "love_test_service::metrics",
        metric_type = "token_verification",
        result = result,
        "token_verification_metric"
    );
}

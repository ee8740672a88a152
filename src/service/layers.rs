//! Outer HTTP layers: CORS, tracing and request logging.

use axum::{http::HeaderValue, middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::middleware::request_logging_middleware;

/// CORS policy for the configured origins. An empty list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin");
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Wrap the router in request logging, tracing and CORS, innermost first.
///
/// Each layer is applied with its own `Router::layer` call so the response
/// body is boxed back into axum's body between them.
pub fn with_http_layers(router: Router, cors_origins: &[String]) -> Router {
    router
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

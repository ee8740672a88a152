//! Love Test REST Service
//!
//! ## Endpoints
//!
//! - `GET /` - Service status and store connectivity
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `POST /save-love-test` - Submit a love test
//! - `POST /save-review` - Submit a review
//! - `GET /get-reviews` - Newest 50 reviews
//! - `POST /admin-login` - Exchange the admin credential for a bearer token
//! - `GET /get-love-tests` - All love tests (admin)
//! - `GET /get-reviews-admin` - All reviews (admin)
//! - `GET /admin/export` - Both collections in one document (admin)
//! - `POST /admin/clear` - Delete everything, with confirmation (admin)

pub mod config;
pub mod error;
pub mod layers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig, StoreBackend};
pub use error::{ApiError, ErrorResponse};
pub use layers::{cors_layer, with_http_layers};
pub use middleware::{record_store_operation, record_token_verification, request_logging_middleware};
pub use routes::{create_router, MAX_BODY_BYTES, PUBLIC_REVIEW_LIMIT};
pub use state::ServiceState;

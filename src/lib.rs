//! # love-test-service
//!
//! REST backend for "love test" submissions and reviews, with a single
//! shared-secret admin login guarding read, export and delete operations.
//!
//! ## Architecture
//!
//! ```text
//! Request → Router → Validator → RecordStore (Postgres or Memory) → JSON
//!             ↑
//!       admin routes: bearer token → TokenService
//! ```
//!
//! ## Guarantees
//!
//! - Every stored record passed validation (stores only accept validated types)
//! - Listings are newest first; the public review listing is capped at 50
//! - Bulk deletion needs the `CONFIRM_DELETE_ALL` sentinel
//! - Server faults never leak internal detail to the caller

#![warn(clippy::all)]

pub mod types;
pub mod validation;
pub mod auth;
pub mod store;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    LoveTestInput, LoveTestRecord, NewLoveTest, NewReview, RecordId, ReviewInput, ReviewRecord,
};
pub use validation::{validate_love_test, validate_review, ValidationError};
pub use auth::{AdminClaims, AdminCredential, AuthError, TokenConfig, TokenService};
pub use store::{clear_all, ClearError, ClearReport, InMemoryRecordStore, RecordStore, CONFIRM_DELETE_ALL};
#[cfg(feature = "postgres")]
pub use store::PostgresRecordStore;

#[cfg(feature = "service")]
pub use service::{create_router, ServiceConfig, ServiceState};

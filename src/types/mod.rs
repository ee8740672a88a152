//! Record types for both collections.

pub mod record_id;
pub mod review;

pub use record_id::RecordId;
pub use love_test::{LoveTestInput, LoveTestRecord, NewLoveTest};
pub use review::{NewReview, ReviewInput, ReviewRecord};

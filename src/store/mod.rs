//! Record storage backends.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{LoveTestRecord, NewLoveTest, NewReview, ReviewRecord};

/// Sentinel that must accompany a bulk delete.
pub const CONFIRM_DELETE_ALL: &str = "CONFIRM_DELETE_ALL";

/// Trait for record storage backends.
///
/// Listings are ordered by `created_at` descending; records created in the
/// same instant come back newest-inserted first. Stores never validate:
/// they only accept [`NewLoveTest`] / [`NewReview`], which the validator
/// produces.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a love test, assigning its id and creation time.
    async fn create_love_test(&self, record: NewLoveTest) -> Result<LoveTestRecord, Self::Error>;

    /// Persist a review, assigning its id and creation time.
    async fn create_review(&self, record: NewReview) -> Result<ReviewRecord, Self::Error>;

    /// All love tests, newest first.
    async fn list_love_tests(&self) -> Result<Vec<LoveTestRecord>, Self::Error>;

    /// Reviews, newest first, at most `limit` if given.
    async fn list_reviews(&self, limit: Option<usize>) -> Result<Vec<ReviewRecord>, Self::Error>;

    /// Number of stored love tests.
    async fn count_love_tests(&self) -> Result<u64, Self::Error>;

    /// Number of stored reviews.
    async fn count_reviews(&self) -> Result<u64, Self::Error>;

    /// Delete every love test. Atomic for this kind; returns the count removed.
    async fn delete_all_love_tests(&self) -> Result<u64, Self::Error>;

    /// Delete every review. Atomic for this kind; returns the count removed.
    async fn delete_all_reviews(&self) -> Result<u64, Self::Error>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), Self::Error>;
}

/// Counts removed by [`clear_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub love_tests: u64,
    pub reviews: u64,
}

impl ClearReport {
    /// Total records removed.
    pub fn total(&self) -> u64 {
        self.love_tests + self.reviews
    }
}

/// Failure of a bulk delete.
#[derive(Debug, thiserror::Error)]
pub enum ClearError<E: std::error::Error + 'static> {
    /// The confirmation sentinel was absent or wrong. Nothing was deleted.
    #[error("Confirmation required. Send {{\"confirmation\": \"{}\"}}", CONFIRM_DELETE_ALL)]
    ConfirmationRequired,
    /// The store failed part-way. Love tests may already be gone.
    #[error("Store error: {0}")]
    Store(#[source] E),
}

/// Delete every record of both kinds.
///
/// Love tests go first, then reviews. Each kind is removed atomically but the
/// pair is not: a failure on reviews leaves the love tests deleted.
pub async fn clear_all<S>(
    store: &S,
    confirmation: Option<&str>,
) -> Result<ClearReport, ClearError<S::Error>>
where
    S: RecordStore + ?Sized,
{
    if confirmation != Some(CONFIRM_DELETE_ALL) {
        return Err(ClearError::ConfirmationRequired);
    }

    let love_tests = store
        .delete_all_love_tests()
        .await
        .map_err(ClearError::Store)?;
    let reviews = store.delete_all_reviews().await.map_err(ClearError::Store)?;

    Ok(ClearReport { love_tests, reviews })
}

pub use memory::InMemoryRecordStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;

//! In-memory record store for tests and local development.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::types::{LoveTestRecord, NewLoveTest, NewReview, RecordId, ReviewRecord};
use super::RecordStore;

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// The store was switched offline with [`InMemoryRecordStore::set_available`].
    #[error("In-memory store is unavailable")]
    Unavailable,
}

#[derive(Debug, Default)]
struct Collections {
    /// Insertion order.
    love_tests: Vec<LoveTestRecord>,
    /// Insertion order.
    reviews: Vec<ReviewRecord>,
}

/// In-memory record store.
///
/// Records are appended in insertion order. The lock is held for one
/// operation at a time and never across an await point.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<Collections>,
    unavailable: AtomicBool,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend going away (or coming back).
    ///
    /// While unavailable every operation fails with [`InMemoryError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), InMemoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(InMemoryError::Unavailable)
        } else {
            Ok(())
        }
    }
}

/// Newest first, insertion order breaking ties.
fn newest_first<T: Clone>(
    records: &[T],
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
    limit: Option<usize>,
) -> Vec<T> {
    let mut sorted: Vec<T> = records.iter().rev().cloned().collect();
    // Stable sort keeps the reversed insertion order for equal timestamps.
    sorted.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    sorted
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    type Error = InMemoryError;

    async fn create_love_test(&self, record: NewLoveTest) -> Result<LoveTestRecord, Self::Error> {
        self.check()?;
        let stored = record.into_record(RecordId::generate(), Utc::now());
        self.collections.write().love_tests.push(stored.clone());
        Ok(stored)
    }

    async fn create_review(&self, record: NewReview) -> Result<ReviewRecord, Self::Error> {
        self.check()?;
        let stored = record.into_record(RecordId::generate(), Utc::now());
        self.collections.write().reviews.push(stored.clone());
        Ok(stored)
    }

    async fn list_love_tests(&self) -> Result<Vec<LoveTestRecord>, Self::Error> {
        self.check()?;
        let collections = self.collections.read();
        Ok(newest_first(&collections.love_tests, |r| r.created_at, None))
    }

    async fn list_reviews(&self, limit: Option<usize>) -> Result<Vec<ReviewRecord>, Self::Error> {
        self.check()?;
        let collections = self.collections.read();
        Ok(newest_first(&collections.reviews, |r| r.created_at, limit))
    }

    async fn count_love_tests(&self) -> Result<u64, Self::Error> {
        self.check()?;
        Ok(self.collections.read().love_tests.len() as u64)
    }

    async fn count_reviews(&self) -> Result<u64, Self::Error> {
        self.check()?;
        Ok(self.collections.read().reviews.len() as u64)
    }

    async fn delete_all_love_tests(&self) -> Result<u64, Self::Error> {
        self.check()?;
        let removed = std::mem::take(&mut self.collections.write().love_tests);
        Ok(removed.len() as u64)
    }

    async fn delete_all_reviews(&self) -> Result<u64, Self::Error> {
        self.check()?;
        let removed = std::mem::take(&mut self.collections.write().reviews);
        Ok(removed.len() as u64)
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{clear_all, ClearError, CONFIRM_DELETE_ALL};
    use crate::types::{LoveTestInput, ReviewInput};
    use crate::validation::{validate_love_test, validate_review};
    use serde_json::json;

    fn love_test(user: &str, score: u32) -> NewLoveTest {
        validate_love_test(LoveTestInput {
            user_name: Some(user.to_string()),
            crush_name: Some("Crush".to_string()),
            score: Some(json!(score)),
            ..Default::default()
        })
        .unwrap()
    }

    fn review(name: &str, rating: u8) -> NewReview {
        validate_review(ReviewInput {
            reviewer_name: Some(name.to_string()),
            rating: Some(json!(rating)),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let store = InMemoryRecordStore::new();
        let before = Utc::now();

        let stored = store.create_love_test(love_test("Asha", 90)).await.unwrap();

        assert!(stored.created_at >= before);
        assert_eq!(stored.user_name, "Asha");
        assert_eq!(store.count_love_tests().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = InMemoryRecordStore::new();
        for i in 0..5 {
            store.create_review(review(&format!("r{}", i), 3)).await.unwrap();
        }

        let listed = store.list_reviews(None).await.unwrap();
        let names: Vec<_> = listed.iter().map(|r| r.reviewer_name.as_str()).collect();
        assert_eq!(names, vec!["r4", "r3", "r2", "r1", "r0"]);
    }

    #[tokio::test]
    async fn test_list_reviews_respects_limit() {
        let store = InMemoryRecordStore::new();
        for i in 0..10 {
            store.create_review(review(&format!("r{}", i), 4)).await.unwrap();
        }

        let listed = store.list_reviews(Some(3)).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].reviewer_name, "r9");
        assert_eq!(store.list_reviews(None).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_clear_all_requires_confirmation() {
        let store = InMemoryRecordStore::new();
        store.create_love_test(love_test("a", 1)).await.unwrap();
        store.create_review(review("b", 2)).await.unwrap();

        for wrong in [None, Some(""), Some("confirm_delete_all"), Some("yes")] {
            let err = clear_all(&store, wrong).await.unwrap_err();
            assert!(matches!(err, ClearError::ConfirmationRequired));
        }
        assert_eq!(store.count_love_tests().await.unwrap(), 1);
        assert_eq!(store.count_reviews().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_reports_deleted_counts() {
        let store = InMemoryRecordStore::new();
        for i in 0..3 {
            store.create_love_test(love_test(&format!("u{}", i), i)).await.unwrap();
        }
        store.create_review(review("b", 2)).await.unwrap();

        let report = clear_all(&store, Some(CONFIRM_DELETE_ALL)).await.unwrap();

        assert_eq!(report.love_tests, 3);
        assert_eq!(report.reviews, 1);
        assert_eq!(report.total(), 4);
        assert_eq!(store.count_love_tests().await.unwrap(), 0);
        assert_eq!(store.count_reviews().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = InMemoryRecordStore::new();
        store.set_available(false);

        assert!(store.ping().await.is_err());
        assert!(store.create_review(review("b", 2)).await.is_err());
        assert!(matches!(
            clear_all(&store, Some(CONFIRM_DELETE_ALL)).await,
            Err(ClearError::Store(InMemoryError::Unavailable))
        ));

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }

    /// In-memory store whose review deletion always fails.
    struct ReviewDeleteFails(InMemoryRecordStore);

    #[async_trait]
    impl RecordStore for ReviewDeleteFails {
        type Error = InMemoryError;

        async fn create_love_test(&self, record: NewLoveTest) -> Result<LoveTestRecord, Self::Error> {
            self.0.create_love_test(record).await
        }

        async fn create_review(&self, record: NewReview) -> Result<ReviewRecord, Self::Error> {
            self.0.create_review(record).await
        }

        async fn list_love_tests(&self) -> Result<Vec<LoveTestRecord>, Self::Error> {
            self.0.list_love_tests().await
        }

        async fn list_reviews(&self, limit: Option<usize>) -> Result<Vec<ReviewRecord>, Self::Error> {
            self.0.list_reviews(limit).await
        }

        async fn count_love_tests(&self) -> Result<u64, Self::Error> {
            self.0.count_love_tests().await
        }

        async fn count_reviews(&self) -> Result<u64, Self::Error> {
            self.0.count_reviews().await
        }

        async fn delete_all_love_tests(&self) -> Result<u64, Self::Error> {
            self.0.delete_all_love_tests().await
        }

        async fn delete_all_reviews(&self) -> Result<u64, Self::Error> {
            Err(InMemoryError::Unavailable)
        }

        async fn ping(&self) -> Result<(), Self::Error> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn test_clear_failure_on_reviews_leaves_love_tests_deleted() {
        let store = ReviewDeleteFails(InMemoryRecordStore::new());
        store.create_love_test(love_test("a", 10)).await.unwrap();
        store.create_love_test(love_test("b", 20)).await.unwrap();
        store.create_review(review("r", 4)).await.unwrap();

        let err = clear_all(&store, Some(CONFIRM_DELETE_ALL)).await.unwrap_err();

        assert!(matches!(err, ClearError::Store(InMemoryError::Unavailable)));
        assert_eq!(store.count_love_tests().await.unwrap(), 0);
        assert_eq!(store.count_reviews().await.unwrap(), 1);
    }
}

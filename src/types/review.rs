//! Reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RecordId;

/// Raw review payload as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub reviewer_name: Option<String>,
    pub reviewer_branch: Option<String>,
    pub rating: Option<Value>,
    pub review_text: Option<String>,
}

/// A review that passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub(crate) reviewer_name: String,
    pub(crate) reviewer_branch: Option<String>,
    pub(crate) rating: u8,
    pub(crate) review_text: Option<String>,
}

impl NewReview {
    /// Reviewer name.
    pub fn reviewer_name(&self) -> &str {
        &self.reviewer_name
    }

    /// Rating in `[1, 5]`.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Optional review body.
    pub fn review_text(&self) -> Option<&str> {
        self.review_text.as_deref()
    }

    /// Attach the server-assigned id and creation time.
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            id,
            reviewer_name: self.reviewer_name,
            reviewer_branch: self.reviewer_branch,
            rating: self.rating,
            review_text: self.review_text,
            created_at,
        }
    }
}

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: RecordId,
    pub reviewer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_branch: Option<String>,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

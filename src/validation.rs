//! Payload validation for both record kinds.
//!
//! Validation is purely structural: presence, length and numeric range.
//! There are no uniqueness or cross-record checks. A payload that fails any
//! rule is rejected as a whole and never reaches a store.

use serde_json::Value;

use crate::types::{LoveTestInput, NewLoveTest, NewReview, ReviewInput};

/// Maximum length of any name field, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum length of a review body, in characters.
pub const MAX_REVIEW_TEXT_CHARS: usize = 500;

/// Inclusive score range for a love test.
pub const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Inclusive rating range for a review.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejection of a client payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The payload violates a field constraint; the message names which.
    #[error("{0}")]
    InvalidInput(String),
}

impl ValidationError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Validate a love test submission.
pub fn validate_love_test(input: LoveTestInput) -> ValidationResult<NewLoveTest> {
    let user_name = required_name("userName", input.user_name)?;
    let crush_name = required_name("crushName", input.crush_name)?;

    let score = input
        .score
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidationError::invalid("score must be a number"))?;
    if !SCORE_RANGE.contains(&score) {
        return Err(ValidationError::invalid("score must be between 0 and 100"));
    }

    Ok(NewLoveTest {
        user_name,
        user_branch: optional_text(input.user_branch),
        crush_name,
        crush_branch: optional_text(input.crush_branch),
        year: optional_text(input.year),
        lab: optional_text(input.lab),
        score,
    })
}

/// Validate a review submission.
pub fn validate_review(input: ReviewInput) -> ValidationResult<NewReview> {
    let reviewer_name = required_name("reviewerName", input.reviewer_name)?;

    let rating = input
        .rating
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidationError::invalid("rating must be a number"))?;
    if rating.fract() != 0.0
        || rating < f64::from(*RATING_RANGE.start())
        || rating > f64::from(*RATING_RANGE.end())
    {
        return Err(ValidationError::invalid(
            "rating must be a whole number between 1 and 5",
        ));
    }

    let review_text = optional_text(input.review_text);
    if let Some(text) = &review_text {
        if text.chars().count() > MAX_REVIEW_TEXT_CHARS {
            return Err(ValidationError::invalid(format!(
                "reviewText must be at most {} characters",
                MAX_REVIEW_TEXT_CHARS
            )));
        }
    }

    Ok(NewReview {
        reviewer_name,
        reviewer_branch: optional_text(input.reviewer_branch),
        rating: rating as u8,
        review_text,
    })
}

fn required_name(field: &str, value: Option<String>) -> ValidationResult<String> {
    let name = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::invalid(format!("{} is required", field)))?;

    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::invalid(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_CHARS
        )));
    }
    Ok(name)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn love_test(user: &str, crush: &str, score: Value) -> LoveTestInput {
        LoveTestInput {
            user_name: Some(user.to_string()),
            crush_name: Some(crush.to_string()),
            score: Some(score),
            ..Default::default()
        }
    }

    fn review(name: &str, rating: Value, text: Option<&str>) -> ReviewInput {
        ReviewInput {
            reviewer_name: Some(name.to_string()),
            rating: Some(rating),
            review_text: text.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_love_test_is_normalized() {
        let mut input = love_test("  Asha ", "Ravi", json!(42.5));
        input.lab = Some("   ".to_string());
        input.year = Some("3rd".to_string());

        let valid = validate_love_test(input).unwrap();
        assert_eq!(valid.user_name(), "Asha");
        assert_eq!(valid.score(), 42.5);
        assert!(valid.lab.is_none());
        assert_eq!(valid.year.as_deref(), Some("3rd"));
    }

    #[test]
    fn test_score_boundaries_are_inclusive() {
        assert!(validate_love_test(love_test("a", "b", json!(0))).is_ok());
        assert!(validate_love_test(love_test("a", "b", json!(100))).is_ok());
        assert!(validate_love_test(love_test("a", "b", json!(-0.01))).is_err());
        assert!(validate_love_test(love_test("a", "b", json!(100.01))).is_err());
    }

    #[test]
    fn test_non_numeric_score_rejected() {
        let err = validate_love_test(love_test("a", "b", json!("90"))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidInput("score must be a number".into()));

        let mut missing = love_test("a", "b", json!(1));
        missing.score = None;
        assert!(validate_love_test(missing).is_err());
    }

    #[test]
    fn test_missing_or_blank_names_rejected() {
        assert!(validate_love_test(love_test("", "b", json!(5))).is_err());
        assert!(validate_love_test(love_test("a", "   ", json!(5))).is_err());

        let mut input = love_test("a", "b", json!(5));
        input.user_name = None;
        assert!(validate_love_test(input).is_err());
    }

    #[test]
    fn test_name_length_counts_characters() {
        let fifty_hearts = "♥".repeat(50);
        assert!(validate_love_test(love_test(&fifty_hearts, "b", json!(5))).is_ok());

        let long = "x".repeat(51);
        assert!(validate_love_test(love_test("a", &long, json!(5))).is_err());
    }

    #[test]
    fn test_valid_review() {
        let valid = validate_review(review("Al", json!(3), Some("ok"))).unwrap();
        assert_eq!(valid.reviewer_name(), "Al");
        assert_eq!(valid.rating(), 3);
        assert_eq!(valid.review_text(), Some("ok"));
    }

    #[test]
    fn test_rating_must_be_whole_and_in_range() {
        assert!(validate_review(review("Al", json!(1), None)).is_ok());
        assert!(validate_review(review("Al", json!(5.0), None)).is_ok());
        assert!(validate_review(review("Al", json!(0), None)).is_err());
        assert!(validate_review(review("Al", json!(7), None)).is_err());
        assert!(validate_review(review("Al", json!(3.5), None)).is_err());
        assert!(validate_review(review("Al", json!(null), None)).is_err());
    }

    #[test]
    fn test_review_text_limit() {
        let at_limit = "r".repeat(MAX_REVIEW_TEXT_CHARS);
        assert!(validate_review(review("Al", json!(4), Some(&at_limit))).is_ok());

        let over = "r".repeat(MAX_REVIEW_TEXT_CHARS + 1);
        assert!(validate_review(review("Al", json!(4), Some(&over))).is_err());
    }
}

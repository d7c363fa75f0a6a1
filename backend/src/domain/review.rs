//! Review aggregate and the approved-rating summary it feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ProductId, ReviewId, UserId};

/// Lowest rating a reviewer may give.
pub const MIN_REVIEW_RATING: u8 = 1;
/// Highest rating a reviewer may give.
pub const MAX_REVIEW_RATING: u8 = 5;

/// Validation failures raised by the review constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewValidationError {
    #[error("rating must lie within [{MIN_REVIEW_RATING}, {MAX_REVIEW_RATING}]")]
    RatingOutOfRange,
}

/// A customer's review of a product.
///
/// ## Invariants
/// - `rating ∈ [1, 5]`.
/// - At most one review exists per (user, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: ReviewId,
    user_id: UserId,
    product_id: ProductId,
    rating: u8,
    title: Option<String>,
    comment: Option<String>,
    is_verified_purchase: bool,
    is_approved: bool,
    helpful_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Unvalidated review fields.
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    pub helpful_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Validate a draft into a review.
    pub fn new(draft: ReviewDraft) -> Result<Self, ReviewValidationError> {
        if !(MIN_REVIEW_RATING..=MAX_REVIEW_RATING).contains(&draft.rating) {
            return Err(ReviewValidationError::RatingOutOfRange);
        }
        Ok(Self {
            id: draft.id,
            user_id: draft.user_id,
            product_id: draft.product_id,
            rating: draft.rating,
            title: draft.title,
            comment: draft.comment,
            is_verified_purchase: draft.is_verified_purchase,
            is_approved: draft.is_approved,
            helpful_count: draft.helpful_count,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_verified_purchase(&self) -> bool {
        self.is_verified_purchase
    }

    /// Whether this review counts toward the product's visible rating.
    pub fn is_approved(&self) -> bool {
        self.is_approved
    }

    pub fn helpful_count(&self) -> u32 {
        self.helpful_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a moderation decision.
    pub fn with_approval(mut self, approved: bool, now: DateTime<Utc>) -> Self {
        self.is_approved = approved;
        self.updated_at = now;
        self
    }
}

/// Product rating aggregate recomputed from approved reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    /// A product with no approved reviews.
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }
}

/// Arithmetic mean over approved ratings. O(n) per call, which is
/// acceptable at this scale.
pub fn summarise_ratings(ratings: &[u8]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::empty();
    }
    let total: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    RatingSummary {
        average: f64::from(total) / ratings.len() as f64,
        count: ratings.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn draft(rating: u8) -> ReviewDraft {
        let now = Utc::now();
        ReviewDraft {
            id: ReviewId::random(),
            user_id: UserId::random(),
            product_id: ProductId::random(),
            rating,
            title: Some("Harika".to_owned()),
            comment: None,
            is_verified_purchase: false,
            is_approved: true,
            helpful_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn rejects_out_of_range_ratings(#[case] rating: u8) {
        let err = Review::new(draft(rating)).expect_err("out of range");
        assert_eq!(err, ReviewValidationError::RatingOutOfRange);
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    fn accepts_boundary_ratings(#[case] rating: u8) {
        let review = Review::new(draft(rating)).expect("valid review");
        assert_eq!(review.rating(), rating);
        assert!(review.is_approved());
    }

    #[rstest]
    fn mean_of_five_and_three_is_four() {
        let summary = summarise_ratings(&[5, 3]);
        assert_eq!(summary.average, 4.0);
        assert_eq!(summary.count, 2);
    }

    #[rstest]
    fn empty_ratings_zero_out_the_summary() {
        assert_eq!(summarise_ratings(&[]), RatingSummary::empty());
    }
}

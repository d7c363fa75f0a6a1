//! Review use-case service: submission and moderation, both of which
//! rewrite the product's approved-rating aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    AddReviewRequest, CatalogRepository, ReviewOps, ReviewRepository, StoreError,
};
use crate::domain::review::{summarise_ratings, Review, ReviewDraft};
use crate::domain::{Error, Identity, ReviewId};
use pagination::{Page, PageRequest};

/// Review operations over the review and catalog repositories.
#[derive(Clone)]
pub struct ReviewService<R, C> {
    reviews: Arc<R>,
    catalog: Arc<C>,
}

impl<R, C> ReviewService<R, C> {
    /// Create a new service with its repositories.
    pub fn new(reviews: Arc<R>, catalog: Arc<C>) -> Self {
        Self { reviews, catalog }
    }
}

#[async_trait]
impl<R, C> ReviewOps for ReviewService<R, C>
where
    R: ReviewRepository,
    C: CatalogRepository,
{
    async fn add_review(
        &self,
        identity: Identity,
        request: AddReviewRequest,
    ) -> Result<Review, Error> {
        let user = identity.require_user()?;

        let product = self
            .catalog
            .find_product(&request.product_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {} not found", request.product_id)))?;

        if self
            .reviews
            .find_by_user_and_product(&user, &request.product_id)
            .await?
            .is_some()
        {
            return Err(Error::duplicate_review(format!(
                "you have already reviewed {}",
                product.name()
            )));
        }

        let now = Utc::now();
        let review = Review::new(ReviewDraft {
            id: ReviewId::random(),
            user_id: user,
            product_id: request.product_id,
            rating: request.rating,
            title: request.title.filter(|t| !t.trim().is_empty()),
            comment: request.comment.filter(|c| !c.trim().is_empty()),
            is_verified_purchase: false,
            is_approved: true,
            helpful_count: 0,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        // The new review is approved by default, so it counts immediately.
        let mut ratings = self.reviews.approved_ratings(&request.product_id).await?;
        ratings.push(review.rating());
        let summary = summarise_ratings(&ratings);

        self.reviews
            .append(&review, summary)
            .await
            .map_err(|err| match err {
                StoreError::Conflict { .. } => Error::duplicate_review(format!(
                    "you have already reviewed {}",
                    product.name()
                )),
                other => other.into(),
            })?;

        tracing::debug!(
            user = %user,
            product = %request.product_id,
            rating = review.rating(),
            "review added"
        );
        Ok(review)
    }

    async fn list_reviews(
        &self,
        identity: Identity,
        page: PageRequest,
    ) -> Result<Page<Review>, Error> {
        identity.require_admin()?;
        Ok(self.reviews.list_all(page).await?)
    }

    async fn set_approval(
        &self,
        identity: Identity,
        id: ReviewId,
        approved: bool,
    ) -> Result<Review, Error> {
        let admin = identity.require_admin()?;
        let review = self
            .reviews
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("review {id} not found")))?;

        let mut ratings = self.reviews.approved_ratings(&review.product_id()).await?;
        if approved && !review.is_approved() {
            ratings.push(review.rating());
        } else if !approved && review.is_approved() {
            if let Some(position) = ratings.iter().position(|r| *r == review.rating()) {
                ratings.remove(position);
            }
        }
        let summary = summarise_ratings(&ratings);

        self.reviews.set_approval(&id, approved, summary).await?;
        tracing::info!(admin = %admin, review = %id, approved, "review moderated");
        Ok(review.with_approval(approved, Utc::now()))
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;

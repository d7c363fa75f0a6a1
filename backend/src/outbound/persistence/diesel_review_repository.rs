//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! Writes that change which ratings count toward a product's aggregate run
//! in a transaction together with the aggregate rewrite, so readers never
//! observe a review without its effect on the product.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{ReviewRepository, StoreError};
use crate::domain::review::{RatingSummary, Review, ReviewDraft};
use crate::domain::{ProductId, ReviewId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewReviewRow, ProductRatingChangeset, ReviewRow};
use super::pool::DbPool;
use super::schema::{products, reviews};

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_review(row: ReviewRow) -> Result<Review, StoreError> {
    Review::new(ReviewDraft {
        id: ReviewId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        product_id: ProductId::from_uuid(row.product_id),
        rating: u8::try_from(row.rating).unwrap_or_default(),
        title: row.title,
        comment: row.comment,
        is_verified_purchase: row.is_verified_purchase,
        is_approved: row.is_approved,
        helpful_count: u32::try_from(row.helpful_count).unwrap_or_default(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| StoreError::query(format!("corrupt review row: {err}")))
}

fn rating_changeset(summary: RatingSummary) -> ProductRatingChangeset {
    ProductRatingChangeset {
        rating: summary.average,
        review_count: i32::try_from(summary.count).unwrap_or(i32::MAX),
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .find(*id.as_uuid())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn find_by_user_and_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<Review>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .filter(reviews::user_id.eq(*user.as_uuid()))
            .filter(reviews::product_id.eq(*product.as_uuid()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn list_approved_for_product(
        &self,
        product: &ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::product_id.eq(*product.as_uuid()))
            .filter(reviews::is_approved.eq(true))
            .order(reviews::created_at.desc())
            .limit(i64::from(limit))
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }

    async fn approved_ratings(&self, product: &ProductId) -> Result<Vec<u8>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ratings: Vec<i16> = reviews::table
            .filter(reviews::product_id.eq(*product.as_uuid()))
            .filter(reviews::is_approved.eq(true))
            .select(reviews::rating)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ratings
            .into_iter()
            .map(|rating| u8::try_from(rating).unwrap_or_default())
            .collect())
    }

    async fn append(&self, review: &Review, summary: RatingSummary) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewReviewRow {
            id: review.id().into(),
            user_id: review.user_id().into(),
            product_id: review.product_id().into(),
            rating: i16::from(review.rating()),
            title: review.title(),
            comment: review.comment(),
            is_verified_purchase: review.is_verified_purchase(),
            is_approved: review.is_approved(),
            helpful_count: i32::try_from(review.helpful_count()).unwrap_or(i32::MAX),
            created_at: review.created_at(),
            updated_at: review.updated_at(),
        };
        let changes = rating_changeset(summary);
        let product_id: uuid::Uuid = review.product_id().into();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(reviews::table)
                    .values(&row)
                    .execute(conn)
                    .await?;

                diesel::update(products::table.find(product_id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn set_approval(
        &self,
        id: &ReviewId,
        approved: bool,
        summary: RatingSummary,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let review_id = *id.as_uuid();
        let changes = rating_changeset(summary);

        conn.transaction(|conn| {
            async move {
                let product_id: uuid::Uuid = diesel::update(reviews::table.find(review_id))
                    .set((
                        reviews::is_approved.eq(approved),
                        reviews::updated_at.eq(Utc::now()),
                    ))
                    .returning(reviews::product_id)
                    .get_result(conn)
                    .await?;

                diesel::update(products::table.find(product_id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_all(&self, page: PageRequest) -> Result<Page<Review>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = reviews::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .order(reviews::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_review)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total.unsigned_abs()))
    }
}

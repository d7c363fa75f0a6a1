//! PostgreSQL-backed `CartRepository` implementation using Diesel ORM.
//!
//! Cart reads join `cart_items` with `products` so callers always see the
//! current price and stock next to each line.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::cart::{CartItem, CartLine};
use crate::domain::ports::{CartRepository, StoreError};
use crate::domain::{CartItemId, ProductId, UserId};

use super::diesel_catalog_repository::row_to_product;
use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CartItemRow, NewCartItemRow, ProductRow};
use super::pool::DbPool;
use super::schema::{cart_items, products};

/// Diesel-backed implementation of the `CartRepository` port.
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_line((item, product): (CartItemRow, ProductRow)) -> Result<CartLine, StoreError> {
    let item = CartItem::new(
        CartItemId::from_uuid(item.id),
        UserId::from_uuid(item.user_id),
        ProductId::from_uuid(item.product_id),
        u32::try_from(item.quantity).unwrap_or_default(),
        item.added_at,
    )
    .map_err(|err| StoreError::query(format!("corrupt cart row: {err}")))?;
    Ok(CartLine {
        item,
        product: row_to_product(product)?,
    })
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn list_lines(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(*user.as_uuid()))
            .order(cart_items::added_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_line).collect()
    }

    async fn find_line_for_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<CartLine>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(*user.as_uuid()))
            .filter(cart_items::product_id.eq(*product.as_uuid()))
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_line).transpose()
    }

    async fn find_line(
        &self,
        user: &UserId,
        item: &CartItemId,
    ) -> Result<Option<CartLine>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::id.eq(*item.as_uuid()))
            .filter(cart_items::user_id.eq(*user.as_uuid()))
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_line).transpose()
    }

    async fn upsert_item(&self, item: &CartItem) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewCartItemRow {
            id: item.id().into(),
            user_id: item.user_id().into(),
            product_id: item.product_id().into(),
            quantity: i32::try_from(item.quantity()).unwrap_or(i32::MAX),
            added_at: item.added_at(),
        };

        diesel::insert_into(cart_items::table)
            .values(&row)
            .on_conflict(cart_items::id)
            .do_update()
            .set(cart_items::quantity.eq(row.quantity))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove_item(&self, user: &UserId, item: &CartItemId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(*item.as_uuid()))
                .filter(cart_items::user_id.eq(*user.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(*user.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Order placement runs in a single transaction: the order and its lines are
//! inserted, each product's stock is decremented with a guard on the current
//! quantity, and the buyer's cart is emptied. A failed guard rolls the whole
//! transaction back.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::order::{Order, OrderDraft, OrderItem, OrderStatus, PaymentStatus};
use crate::domain::ports::{OrderFilter, OrderRepository, PlaceOrderError, StoreError};
use crate::domain::{OrderId, ProductId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, OrderStatusChangeset};
use super::pool::DbPool;
use super::schema::{cart_items, order_items, orders, products};

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Error carried out of the placement transaction before domain mapping.
enum PlaceTxError {
    Diesel(diesel::result::Error),
    InsufficientStock(Uuid),
}

impl From<diesel::result::Error> for PlaceTxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn row_to_order(row: OrderRow, item_rows: Vec<OrderItemRow>) -> Result<Order, StoreError> {
    let corrupt = |err: &dyn std::fmt::Display| StoreError::query(format!("corrupt order row: {err}"));

    let items = item_rows
        .into_iter()
        .map(|item| {
            OrderItem::from_stored(
                ProductId::from_uuid(item.product_id),
                u32::try_from(item.quantity).unwrap_or_default(),
                item.unit_price,
                item.total_price,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| corrupt(&err))?;

    Order::new(OrderDraft {
        id: OrderId::from_uuid(row.id),
        order_number: row.order_number,
        user_id: UserId::from_uuid(row.user_id),
        status: OrderStatus::from_str(&row.status).map_err(|err| corrupt(&err))?,
        payment_status: PaymentStatus::from_str(&row.payment_status)
            .map_err(|err| corrupt(&err))?,
        shipping_fee: row.shipping_fee,
        total_amount: row.total_amount,
        shipping_address: row.shipping_address,
        billing_address: row.billing_address,
        payment_method: row.payment_method,
        notes: row.notes,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
        shipped_at: row.shipped_at,
        delivered_at: row.delivered_at,
    })
    .map_err(|err| corrupt(&err))
}

impl DieselOrderRepository {
    /// Load the lines for a batch of orders and zip them back together.
    async fn hydrate(
        &self,
        rows: Vec<OrderRow>,
        conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
            '_,
            diesel_async::AsyncPgConnection,
        >,
    ) -> Result<Vec<Order>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut lines: Vec<OrderItemRow> = order_items::table
            .filter(order_items::order_id.eq_any(&ids))
            .select(OrderItemRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                let (mine, rest): (Vec<_>, Vec<_>) =
                    lines.drain(..).partition(|line| line.order_id == row.id);
                lines = rest;
                row_to_order(row, mine)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), PlaceOrderError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PlaceOrderError::Store(map_pool_error(err)))?;

        let order_row = NewOrderRow {
            id: order.id().into(),
            order_number: order.order_number(),
            user_id: order.user_id().into(),
            status: order.status().to_string(),
            payment_status: order.payment_status().to_string(),
            shipping_fee: order.shipping_fee(),
            total_amount: order.total_amount(),
            shipping_address: order.shipping_address(),
            billing_address: order.billing_address(),
            payment_method: order.payment_method(),
            notes: order.notes(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        };
        let item_rows: Vec<NewOrderItemRow> = order
            .items()
            .iter()
            .map(|item| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id: order.id().into(),
                product_id: item.product_id().into(),
                quantity: i32::try_from(item.quantity()).unwrap_or(i32::MAX),
                unit_price: item.unit_price(),
                total_price: item.total_price(),
            })
            .collect();
        let buyer: Uuid = order.user_id().into();

        let result: Result<(), PlaceTxError> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(orders::table)
                        .values(&order_row)
                        .execute(conn)
                        .await?;

                    diesel::insert_into(order_items::table)
                        .values(&item_rows)
                        .execute(conn)
                        .await?;

                    for item in &item_rows {
                        let updated = diesel::update(
                            products::table
                                .filter(products::id.eq(item.product_id))
                                .filter(products::stock_quantity.ge(item.quantity)),
                        )
                        .set(
                            products::stock_quantity.eq(products::stock_quantity - item.quantity),
                        )
                        .execute(conn)
                        .await?;

                        if updated == 0 {
                            return Err(PlaceTxError::InsufficientStock(item.product_id));
                        }
                    }

                    diesel::delete(cart_items::table.filter(cart_items::user_id.eq(buyer)))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(PlaceTxError::InsufficientStock(product_id)) => {
                Err(PlaceOrderError::InsufficientStock {
                    product_id: ProductId::from_uuid(product_id),
                })
            }
            // The only unique constraint these inserts can trip is the order
            // number.
            Err(PlaceTxError::Diesel(err)) => match map_diesel_error(err) {
                StoreError::Conflict { .. } => Err(PlaceOrderError::DuplicateOrderNumber),
                other => Err(PlaceOrderError::Store(other)),
            },
        }
    }

    async fn find_for_user(
        &self,
        user: &UserId,
        id: &OrderId,
    ) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrderRow> = orders::table
            .find(*id.as_uuid())
            .filter(orders::user_id.eq(*user.as_uuid()))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row], &mut conn).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrderRow> = orders::table
            .find(*id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row], &mut conn).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = orders::table
            .filter(orders::user_id.eq(*user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(*user.as_uuid()))
            .order(orders::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = self.hydrate(rows, &mut conn).await?;
        Ok(Page::new(items, page, total.unsigned_abs()))
    }

    async fn list_all(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count_query = orders::table.into_boxed();
        let mut page_query = orders::table.into_boxed();
        if let Some(status) = filter.status {
            count_query = count_query.filter(orders::status.eq(status.to_string()));
            page_query = page_query.filter(orders::status.eq(status.to_string()));
        }

        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<OrderRow> = page_query
            .order(orders::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = self.hydrate(rows, &mut conn).await?;
        Ok(Page::new(items, page, total.unsigned_abs()))
    }

    async fn update_status(&self, order: &Order) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = OrderStatusChangeset {
            status: order.status().to_string(),
            payment_status: order.payment_status().to_string(),
            updated_at: order.updated_at(),
            shipped_at: order.shipped_at(),
            delivered_at: order.delivered_at(),
        };

        diesel::update(orders::table.find(*order.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

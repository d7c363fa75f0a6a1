//! Checkout use-case service: the cart-to-order transition and order
//! tracking.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;

use crate::domain::cart::CartLine;
use crate::domain::order::{
    generate_order_number, quote_cart, Order, OrderDraft, OrderItem, OrderStatus, PaymentStatus,
};
use crate::domain::ports::{
    CartRepository, CheckoutOps, CheckoutPreview, OrderFilter, OrderRepository, PlaceOrderError,
    PlaceOrderRequest,
};
use crate::domain::{Error, Identity, OrderId, UserId};
use pagination::{Page, PageRequest};

/// Attempts at allocating a unique order number before giving up.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// Checkout operations over the cart and order repositories.
#[derive(Clone)]
pub struct CheckoutService<K, O> {
    carts: Arc<K>,
    orders: Arc<O>,
}

impl<K, O> CheckoutService<K, O> {
    /// Create a new service with its repositories.
    pub fn new(carts: Arc<K>, orders: Arc<O>) -> Self {
        Self { carts, orders }
    }
}

fn insufficient_stock(line: &CartLine) -> Error {
    Error::out_of_stock(format!(
        "only {} of {} available",
        line.product.stock_quantity(),
        line.product.name()
    ))
    .with_details(json!({
        "productId": line.product.id(),
        "available": line.product.stock_quantity(),
        "requested": line.item.quantity(),
    }))
}

/// All-or-nothing stock validation; the first failing line aborts.
fn validate_stock(lines: &[CartLine]) -> Result<(), Error> {
    for line in lines {
        if line.item.quantity() > line.product.stock_quantity() {
            return Err(insufficient_stock(line));
        }
    }
    Ok(())
}

impl<K, O> CheckoutService<K, O>
where
    K: CartRepository,
    O: OrderRepository,
{
    async fn loaded_cart(&self, user: &UserId) -> Result<Vec<CartLine>, Error> {
        let lines = self.carts.list_lines(user).await?;
        if lines.is_empty() {
            return Err(Error::empty_cart("your cart is empty"));
        }
        Ok(lines)
    }
}

#[async_trait]
impl<K, O> CheckoutOps for CheckoutService<K, O>
where
    K: CartRepository,
    O: OrderRepository,
{
    async fn preview(&self, identity: Identity) -> Result<CheckoutPreview, Error> {
        let user = identity.require_user()?;
        let lines = self.loaded_cart(&user).await?;
        validate_stock(&lines)?;
        let quote = quote_cart(&lines);
        Ok(CheckoutPreview { lines, quote })
    }

    async fn place_order(
        &self,
        identity: Identity,
        request: PlaceOrderRequest,
    ) -> Result<Order, Error> {
        let user = identity.require_user()?;
        if request.shipping_address.trim().is_empty() {
            return Err(Error::invalid_request("shipping address is required"));
        }
        if request.payment_method.trim().is_empty() {
            return Err(Error::invalid_request("payment method is required"));
        }

        let lines = self.loaded_cart(&user).await?;
        validate_stock(&lines)?;
        let quote = quote_cart(&lines);

        let items = lines
            .iter()
            .map(|line| {
                OrderItem::new(
                    line.product.id(),
                    line.item.quantity(),
                    line.product.price(),
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::internal(format!("invalid order line: {err}")))?;

        let mut rng = SmallRng::from_entropy();
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let now = Utc::now();
            let order = Order::new(OrderDraft {
                id: OrderId::random(),
                order_number: generate_order_number(&mut rng, now),
                user_id: user,
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
                shipping_fee: quote.shipping_fee,
                total_amount: quote.grand_total,
                shipping_address: request.shipping_address.clone(),
                billing_address: request.billing_address.clone(),
                payment_method: request.payment_method.clone(),
                notes: request.notes.clone(),
                items: items.clone(),
                created_at: now,
                updated_at: now,
                shipped_at: None,
                delivered_at: None,
            })
            .map_err(|err| Error::internal(format!("invalid order draft: {err}")))?;

            match self.orders.place(&order).await {
                Ok(()) => {
                    tracing::info!(
                        user = %user,
                        order_number = order.order_number(),
                        total = order.total_amount(),
                        "order placed"
                    );
                    return Ok(order);
                }
                // Collision with an existing order number; roll the dice again.
                Err(PlaceOrderError::DuplicateOrderNumber) => continue,
                Err(PlaceOrderError::InsufficientStock { product_id }) => {
                    tracing::warn!(user = %user, product = %product_id, "checkout lost stock race");
                    let line = lines
                        .iter()
                        .find(|line| line.product.id() == product_id);
                    return Err(match line {
                        Some(line) => insufficient_stock(line),
                        None => Error::out_of_stock("insufficient stock"),
                    });
                }
                Err(PlaceOrderError::Store(err)) => return Err(err.into()),
            }
        }
        Err(Error::conflict("could not allocate a unique order number"))
    }

    async fn my_orders(
        &self,
        identity: Identity,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        let user = identity.require_user()?;
        Ok(self.orders.list_for_user(&user, page).await?)
    }

    async fn get_order(&self, identity: Identity, id: OrderId) -> Result<Order, Error> {
        let user = identity.require_user()?;
        self.orders
            .find_for_user(&user, &id)
            .await?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    async fn cancel(&self, identity: Identity, id: OrderId) -> Result<Order, Error> {
        let user = identity.require_user()?;
        let order = self
            .orders
            .find_for_user(&user, &id)
            .await?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))?;

        if !order.can_user_cancel() {
            return Err(Error::conflict("only pending orders can be cancelled"));
        }

        let cancelled = order.with_status(OrderStatus::Cancelled, Utc::now());
        self.orders.update_status(&cancelled).await?;
        tracing::info!(user = %user, order_number = cancelled.order_number(), "order cancelled");
        Ok(cancelled)
    }

    async fn list_orders(
        &self,
        identity: Identity,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        identity.require_admin()?;
        Ok(self.orders.list_all(filter, page).await?)
    }

    async fn set_status(
        &self,
        identity: Identity,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, Error> {
        let admin = identity.require_admin()?;
        let order = self
            .orders
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))?;

        // Admin edits deliberately skip the transition guard that applies to
        // customer cancellation.
        let updated = order.with_status(status, Utc::now());
        self.orders.update_status(&updated).await?;
        tracing::info!(
            admin = %admin,
            order_number = updated.order_number(),
            status = %status,
            "order status updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "checkout_service_tests.rs"]
mod tests;

//! Cart use-case service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::domain::cart::{cart_item_count, cart_total, CartItem};
use crate::domain::catalog::Product;
use crate::domain::ports::{CartOps, CartRepository, CartView, CatalogRepository};
use crate::domain::{CartItemId, Error, Identity, ProductId, UserId};

/// Cart operations over the cart and catalog repositories.
#[derive(Clone)]
pub struct CartService<K, C> {
    carts: Arc<K>,
    catalog: Arc<C>,
}

impl<K, C> CartService<K, C> {
    /// Create a new service with its repositories.
    pub fn new(carts: Arc<K>, catalog: Arc<C>) -> Self {
        Self { carts, catalog }
    }
}

fn stock_error(product: &Product, requested: u32, in_cart: u32) -> Error {
    let message = if product.stock_quantity() == 0 {
        format!("{} is out of stock", product.name())
    } else {
        format!(
            "only {} of {} available",
            product.stock_quantity(),
            product.name()
        )
    };
    Error::out_of_stock(message).with_details(json!({
        "productId": product.id(),
        "available": product.stock_quantity(),
        "requested": requested,
        "inCart": in_cart,
    }))
}

impl<K, C> CartService<K, C>
where
    K: CartRepository,
    C: CatalogRepository,
{
    async fn view_for(&self, user: &UserId) -> Result<CartView, Error> {
        let lines = self.carts.list_lines(user).await?;
        let total = cart_total(&lines);
        let item_count = cart_item_count(&lines);
        Ok(CartView {
            lines,
            total,
            item_count,
        })
    }
}

#[async_trait]
impl<K, C> CartOps for CartService<K, C>
where
    K: CartRepository,
    C: CatalogRepository,
{
    async fn add(
        &self,
        identity: Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, Error> {
        let user = identity.require_user()?;
        if quantity == 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }

        let product = self
            .catalog
            .find_product(&product_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {product_id} not found")))?;

        if !product.is_in_stock() {
            return Err(stock_error(&product, quantity, 0));
        }

        let existing = self.carts.find_line_for_product(&user, &product_id).await?;
        let in_cart = existing.as_ref().map_or(0, |line| line.item.quantity());
        let merged = in_cart
            .checked_add(quantity)
            .ok_or_else(|| stock_error(&product, quantity, in_cart))?;
        if merged > product.stock_quantity() {
            return Err(stock_error(&product, quantity, in_cart));
        }

        let item = match existing {
            Some(line) => CartItem::new(
                line.item.id(),
                user,
                product_id,
                merged,
                line.item.added_at(),
            ),
            None => CartItem::new(CartItemId::random(), user, product_id, merged, Utc::now()),
        }
        .map_err(|err| Error::internal(format!("invalid cart row: {err}")))?;

        self.carts.upsert_item(&item).await?;
        tracing::debug!(user = %user, product = %product_id, quantity = merged, "cart add");
        self.view_for(&user).await
    }

    async fn update(
        &self,
        identity: Identity,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartView, Error> {
        let user = identity.require_user()?;
        if quantity == 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }

        let line = self
            .carts
            .find_line(&user, &item_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("cart item {item_id} not found")))?;

        if quantity > line.product.stock_quantity() {
            return Err(stock_error(&line.product, quantity, line.item.quantity()));
        }

        let item = CartItem::new(
            item_id,
            user,
            line.item.product_id(),
            quantity,
            line.item.added_at(),
        )
        .map_err(|err| Error::internal(format!("invalid cart row: {err}")))?;

        self.carts.upsert_item(&item).await?;
        self.view_for(&user).await
    }

    async fn remove(&self, identity: Identity, item_id: CartItemId) -> Result<CartView, Error> {
        let user = identity.require_user()?;
        self.carts.remove_item(&user, &item_id).await?;
        self.view_for(&user).await
    }

    async fn clear(&self, identity: Identity) -> Result<(), Error> {
        let user = identity.require_user()?;
        self.carts.clear(&user).await?;
        Ok(())
    }

    async fn view(&self, identity: Identity) -> Result<CartView, Error> {
        let user = identity.require_user()?;
        self.view_for(&user).await
    }

    async fn count(&self, identity: Identity) -> Result<u32, Error> {
        let user = identity.require_user()?;
        let lines = self.carts.list_lines(&user).await?;
        Ok(cart_item_count(&lines))
    }
}

#[cfg(test)]
#[path = "cart_service_tests.rs"]
mod tests;

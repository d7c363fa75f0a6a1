//! Cart aggregate: per-user pending product selections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::Product;
use crate::domain::{CartItemId, ProductId, UserId};

/// Validation failures raised by the cart constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartValidationError {
    #[error("cart quantity must be at least 1")]
    ZeroQuantity,
}

/// One row of a user's cart.
///
/// ## Invariants
/// - `quantity >= 1`.
/// - At most one row exists per (user, product); merges happen on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
    added_at: DateTime<Utc>,
}

impl CartItem {
    /// Validate and construct a cart row.
    pub fn new(
        id: CartItemId,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        added_at: DateTime<Utc>,
    ) -> Result<Self, CartValidationError> {
        if quantity == 0 {
            return Err(CartValidationError::ZeroQuantity);
        }
        Ok(Self {
            id,
            user_id,
            product_id,
            quantity,
            added_at,
        })
    }

    pub fn id(&self) -> CartItemId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }
}

/// A cart row joined with its product, as checkout and totals need both.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Quantity × current product price.
    pub fn line_total(&self) -> f64 {
        f64::from(self.item.quantity()) * self.product.price()
    }
}

/// Sum of line totals over a cart; purely derived, never stored.
pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::line_total).sum()
}

/// Total quantity across all rows, for the cart badge.
pub fn cart_item_count(lines: &[CartLine]) -> u32 {
    lines.iter().map(|line| line.item.quantity()).sum()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::catalog::ProductDraft;
    use crate::domain::CategoryId;

    fn product(price: f64, stock: u32) -> Product {
        let now = Utc::now();
        Product::new(ProductDraft {
            id: ProductId::random(),
            category_id: CategoryId::random(),
            name: "Oyun Faresi".to_owned(),
            description: None,
            brand: None,
            image_url: None,
            price,
            original_price: None,
            shipping_fee: 14.99,
            commission_fee: 5.0,
            tax_fee: 20.0,
            stock_quantity: stock,
            is_active: true,
            is_featured: false,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        })
        .expect("valid product")
    }

    fn line(price: f64, quantity: u32) -> CartLine {
        let product = product(price, 10);
        let item = CartItem::new(
            CartItemId::random(),
            UserId::random(),
            product.id(),
            quantity,
            Utc::now(),
        )
        .expect("valid item");
        CartLine { item, product }
    }

    #[rstest]
    fn rejects_zero_quantity() {
        let err = CartItem::new(
            CartItemId::random(),
            UserId::random(),
            ProductId::random(),
            0,
            Utc::now(),
        )
        .expect_err("zero quantity");
        assert_eq!(err, CartValidationError::ZeroQuantity);
    }

    #[rstest]
    fn totals_sum_over_lines() {
        let lines = vec![line(100.0, 2), line(20.0, 1)];
        assert!((cart_total(&lines) - 220.0).abs() < 1e-9);
        assert_eq!(cart_item_count(&lines), 3);
    }

    #[rstest]
    fn empty_cart_totals_are_zero() {
        assert_eq!(cart_total(&[]), 0.0);
        assert_eq!(cart_item_count(&[]), 0);
    }
}

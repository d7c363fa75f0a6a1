//! Order aggregate: checkout quotes, order numbers, and the status machine.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cart::{cart_total, CartLine};
use crate::domain::{OrderId, ProductId, UserId};

/// Subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;

/// Flat shipping fee charged below the threshold.
pub const FLAT_SHIPPING_FEE: f64 = 15.0;

/// Order numbers read `TR` + `YYYYMMDD` + four random digits.
pub const ORDER_NUMBER_PREFIX: &str = "TR";

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the one-directional machine admits this transition.
    ///
    /// Pending → {Confirmed, Cancelled}, Confirmed → {Shipped, Cancelled},
    /// Shipped → Delivered. Delivered and Cancelled are terminal.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Payment status recorded alongside the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = OrderValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation failures raised by the order constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderValidationError {
    #[error("order item quantity must be at least 1")]
    ZeroQuantity,
    #[error("order item unit price must be greater than zero")]
    NonPositiveUnitPrice,
    #[error("order item total must equal quantity times unit price")]
    InconsistentItemTotal,
    #[error("an order must contain at least one item")]
    NoItems,
    #[error("order total must equal the item totals plus the shipping fee")]
    InconsistentTotal,
    #[error("shipping address must not be empty")]
    EmptyShippingAddress,
    #[error("payment method must not be empty")]
    EmptyPaymentMethod,
    #[error("unknown order status: {value}")]
    UnknownStatus { value: String },
}

/// Quote for a cart about to become an order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub grand_total: f64,
}

/// Shipping fee for a subtotal: free at or above the threshold.
pub fn shipping_fee_for(subtotal: f64) -> f64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        0.0
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// Quote the given cart lines at current product prices.
pub fn quote_cart(lines: &[CartLine]) -> CheckoutQuote {
    let subtotal = cart_total(lines);
    let shipping_fee = shipping_fee_for(subtotal);
    CheckoutQuote {
        subtotal,
        shipping_fee,
        grand_total: subtotal + shipping_fee,
    }
}

/// Generate an order number from the current date and a random suffix.
///
/// Uniqueness is not guaranteed by construction; callers retry on a
/// unique-key conflict from the store.
pub fn generate_order_number(rng: &mut impl Rng, now: DateTime<Utc>) -> String {
    let suffix: u16 = rng.gen_range(0..10_000);
    format!(
        "{ORDER_NUMBER_PREFIX}{}{suffix:04}",
        now.format("%Y%m%d")
    )
}

/// A line of a placed order, snapshotting the price at order time.
///
/// Never mutated after creation; later product price changes do not
/// affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    product_id: ProductId,
    quantity: u32,
    unit_price: f64,
    total_price: f64,
}

impl OrderItem {
    /// Validate and construct an order line.
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        unit_price: f64,
    ) -> Result<Self, OrderValidationError> {
        if quantity == 0 {
            return Err(OrderValidationError::ZeroQuantity);
        }
        if unit_price <= 0.0 {
            return Err(OrderValidationError::NonPositiveUnitPrice);
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            total_price: f64::from(quantity) * unit_price,
        })
    }

    /// Reconstruct a stored line, checking the persisted total.
    pub fn from_stored(
        product_id: ProductId,
        quantity: u32,
        unit_price: f64,
        total_price: f64,
    ) -> Result<Self, OrderValidationError> {
        let line = Self::new(product_id, quantity, unit_price)?;
        if (line.total_price - total_price).abs() > 1e-6 {
            return Err(OrderValidationError::InconsistentItemTotal);
        }
        Ok(line)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }
}

/// Unvalidated order fields.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_fee: f64,
    pub total_amount: f64,
    pub shipping_address: String,
    pub billing_address: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// A placed order with its lines.
///
/// ## Invariants
/// - `total_amount = Σ items.total_price + shipping_fee`.
/// - Status only moves along [`OrderStatus::can_transition_to`] for
///   customer-initiated changes; admin edits bypass the guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    status: OrderStatus,
    payment_status: PaymentStatus,
    shipping_fee: f64,
    total_amount: f64,
    shipping_address: String,
    billing_address: Option<String>,
    payment_method: String,
    notes: Option<String>,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Validate a draft into an order.
    pub fn new(draft: OrderDraft) -> Result<Self, OrderValidationError> {
        if draft.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        if draft.shipping_address.trim().is_empty() {
            return Err(OrderValidationError::EmptyShippingAddress);
        }
        if draft.payment_method.trim().is_empty() {
            return Err(OrderValidationError::EmptyPaymentMethod);
        }
        let item_total: f64 = draft.items.iter().map(OrderItem::total_price).sum();
        if (item_total + draft.shipping_fee - draft.total_amount).abs() > 1e-6 {
            return Err(OrderValidationError::InconsistentTotal);
        }
        Ok(Self {
            id: draft.id,
            order_number: draft.order_number,
            user_id: draft.user_id,
            status: draft.status,
            payment_status: draft.payment_status,
            shipping_fee: draft.shipping_fee,
            total_amount: draft.total_amount,
            shipping_address: draft.shipping_address,
            billing_address: draft.billing_address,
            payment_method: draft.payment_method,
            notes: draft.notes,
            items: draft.items,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            shipped_at: draft.shipped_at,
            delivered_at: draft.delivered_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        self.order_number.as_str()
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn shipping_fee(&self) -> f64 {
        self.shipping_fee
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn shipping_address(&self) -> &str {
        self.shipping_address.as_str()
    }

    pub fn billing_address(&self) -> Option<&str> {
        self.billing_address.as_deref()
    }

    pub fn payment_method(&self) -> &str {
        self.payment_method.as_str()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn items(&self) -> &[OrderItem] {
        self.items.as_slice()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(OrderItem::quantity).sum()
    }

    /// Whether the customer may still cancel: Pending only.
    pub fn can_user_cancel(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Apply a status change, stamping shipment timestamps.
    ///
    /// The caller decides whether the transition is permitted; this only
    /// records it. Shipped stamps `shipped_at`, Delivered stamps
    /// `delivered_at`.
    pub fn with_status(mut self, status: OrderStatus, now: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = now;
        match status {
            OrderStatus::Shipped => self.shipped_at = Some(now),
            OrderStatus::Delivered => self.delivered_at = Some(now),
            _ => {}
        }
        self
    }
}

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;

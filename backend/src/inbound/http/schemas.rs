//! Response payloads shared by the HTTP handler modules.
//!
//! Domain types stay off the wire; each response struct fixes the JSON shape
//! and OpenAPI schema independently of how the domain evolves.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::cart::CartLine;
use crate::domain::catalog::{Category, Product};
use crate::domain::order::{CheckoutQuote, Order, OrderItem, OrderStatus, PaymentStatus};
use crate::domain::ports::CartView;
use crate::domain::review::Review;
use crate::domain::user::User;
use pagination::Page;

/// One page of results with its paging envelope.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Convert a domain page, mapping each item into its response shape.
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        let page = page.map(f);
        Self {
            items: page.items,
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }
}

/// Public account details; the password hash never leaves the domain.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_owned(),
            email: user.email().map(str::to_owned),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().to_owned(),
            is_admin: user.is_admin(),
            active: user.is_active(),
            last_login: user.last_login().map(|at| at.to_rfc3339()),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// A browsing category.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().to_owned(),
            description: category.description().map(str::to_owned),
            is_active: category.is_active(),
        }
    }
}

/// A catalog product with its derived pricing fields.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    /// Price with commission, tax, and shipping fees applied.
    pub final_price: f64,
    pub discount_percentage: u32,
    pub stock_quantity: u32,
    pub in_stock: bool,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: f64,
    pub review_count: u32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id().to_string(),
            category_id: product.category_id().to_string(),
            name: product.name().to_owned(),
            description: product.description().map(str::to_owned),
            brand: product.brand().map(str::to_owned),
            image_url: product.image_url().map(str::to_owned),
            price: product.price(),
            original_price: product.original_price(),
            final_price: product.final_price(),
            discount_percentage: product.discount_percentage(),
            stock_quantity: product.stock_quantity(),
            in_stock: product.is_in_stock(),
            is_active: product.is_active(),
            is_featured: product.is_featured(),
            rating: product.rating(),
            review_count: product.review_count(),
        }
    }
}

/// One cart row with its product and derived line total.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub item_id: String,
    pub quantity: u32,
    pub line_total: f64,
    pub product: ProductResponse,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            item_id: line.item.id().to_string(),
            quantity: line.item.quantity(),
            line_total: line.line_total(),
            product: ProductResponse::from(line.product),
        }
    }
}

/// The whole cart with its derived totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartViewResponse {
    pub lines: Vec<CartLineResponse>,
    pub total: f64,
    pub item_count: u32,
}

impl From<CartView> for CartViewResponse {
    fn from(view: CartView) -> Self {
        Self {
            lines: view.lines.into_iter().map(CartLineResponse::from).collect(),
            total: view.total,
            item_count: view.item_count,
        }
    }
}

/// Quoted totals for a cart about to become an order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub subtotal: f64,
    pub shipping_fee: f64,
    pub grand_total: f64,
}

impl From<CheckoutQuote> for QuoteResponse {
    fn from(quote: CheckoutQuote) -> Self {
        Self {
            subtotal: quote.subtotal,
            shipping_fee: quote.shipping_fee,
            grand_total: quote.grand_total,
        }
    }
}

/// One order line priced at purchase time.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            total_price: item.total_price(),
        }
    }
}

/// A placed order with its lines.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_fee: f64,
    pub total_amount: f64,
    pub shipping_address: String,
    pub billing_address: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub shipped_at: Option<String>,
    pub delivered_at: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number().to_owned(),
            status: order.status(),
            payment_status: order.payment_status(),
            shipping_fee: order.shipping_fee(),
            total_amount: order.total_amount(),
            shipping_address: order.shipping_address().to_owned(),
            billing_address: order.billing_address().map(str::to_owned),
            payment_method: order.payment_method().to_owned(),
            notes: order.notes().map(str::to_owned),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at().to_rfc3339(),
            shipped_at: order.shipped_at().map(|at| at.to_rfc3339()),
            delivered_at: order.delivered_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// A product review.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub product_id: String,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    pub helpful_count: u32,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id().to_string(),
            product_id: review.product_id().to_string(),
            rating: review.rating(),
            title: review.title().map(str::to_owned),
            comment: review.comment().map(str::to_owned),
            is_verified_purchase: review.is_verified_purchase(),
            is_approved: review.is_approved(),
            helpful_count: review.helpful_count(),
            created_at: review.created_at().to_rfc3339(),
        }
    }
}

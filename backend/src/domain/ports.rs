//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches its adapters (the Diesel
//! repositories); driving ports are the use-case traits HTTP handlers
//! consume. Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::cart::{CartItem, CartLine};
use crate::domain::catalog::{Category, Product};
use crate::domain::order::{CheckoutQuote, Order, OrderStatus};
use crate::domain::review::{RatingSummary, Review};
use crate::domain::user::User;
use crate::domain::{
    CartItemId, CategoryId, Error, Identity, OrderId, ProductId, ReviewId, UserId,
};

/// Failures surfaced by the persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connectivity or pool checkout failures.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A unique constraint rejected the write.
    #[error("store conflict: {message}")]
    Conflict { message: String },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-constraint conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Connection { message } => {
                Self::service_unavailable(format!("store unavailable: {message}"))
            }
            StoreError::Query { message } => Self::internal(format!("store error: {message}")),
            StoreError::Conflict { message } => Self::conflict(message),
        }
    }
}

/// Failures specific to the atomic checkout write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A concurrent checkout drained the stock between validation and
    /// decrement; the transaction was rolled back.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },
    /// The generated order number collided with an existing order.
    #[error("order number already exists")]
    DuplicateOrderNumber,
}

/// Sort orders accepted by product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Alphabetical by name; the listing default.
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
}

/// Filter applied to product listings and search.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    /// Substring match over name, description, and brand.
    pub query: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Customer-facing listings hide inactive products; admin ones do not.
    pub only_active: bool,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Customer-facing filter: active products only.
    pub fn active() -> Self {
        Self {
            only_active: true,
            ..Self::default()
        }
    }
}

/// Filter applied to the admin order listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; `Conflict` when the username is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Stamp the account's last successful login.
    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn list(&self, page: PageRequest) -> Result<Page<User>, StoreError>;
}

/// Persistence port for categories and products.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError>;

    async fn update_category(&self, category: &Category) -> Result<(), StoreError>;

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError>;

    async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>, StoreError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    /// Active featured products for the storefront, newest first.
    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, StoreError>;

    /// Active products sharing a category, excluding the product itself.
    async fn similar_products(
        &self,
        category: &CategoryId,
        exclude: &ProductId,
        limit: u32,
    ) -> Result<Vec<Product>, StoreError>;
}

/// Persistence port for cart rows.
///
/// Lines are returned joined with their product; every cart decision needs
/// current stock and price.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list_lines(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError>;

    async fn find_line_for_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<CartLine>, StoreError>;

    async fn find_line(
        &self,
        user: &UserId,
        item: &CartItemId,
    ) -> Result<Option<CartLine>, StoreError>;

    /// Insert the row, or replace the quantity of the (user, product) row.
    async fn upsert_item(&self, item: &CartItem) -> Result<(), StoreError>;

    /// Delete one row; succeeds even when the row is already gone.
    async fn remove_item(&self, user: &UserId, item: &CartItemId) -> Result<(), StoreError>;

    /// Delete every row of the user's cart; idempotent.
    async fn clear(&self, user: &UserId) -> Result<(), StoreError>;
}

/// Persistence port for orders, including the atomic checkout write.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order and its items, decrement each product's stock, and
    /// clear the user's cart as one transaction. Any failure rolls back the
    /// whole write set.
    async fn place(&self, order: &Order) -> Result<(), PlaceOrderError>;

    async fn find_for_user(
        &self,
        user: &UserId,
        id: &OrderId,
    ) -> Result<Option<Order>, StoreError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// The user's orders, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError>;

    /// All orders, newest first, optionally filtered by status.
    async fn list_all(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError>;

    /// Rewrite status, payment status, and shipment stamps.
    async fn update_status(&self, order: &Order) -> Result<(), StoreError>;
}

/// Persistence port for reviews and the product rating aggregate.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, StoreError>;

    async fn find_by_user_and_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<Review>, StoreError>;

    /// Approved reviews for a product, newest first, capped.
    async fn list_approved_for_product(
        &self,
        product: &ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, StoreError>;

    /// Rating values of all approved reviews for a product.
    async fn approved_ratings(&self, product: &ProductId) -> Result<Vec<u8>, StoreError>;

    /// Insert the review and rewrite the product's rating aggregate in one
    /// transaction. `Conflict` when the (user, product) pair already has a
    /// review.
    async fn append(&self, review: &Review, summary: RatingSummary) -> Result<(), StoreError>;

    /// Toggle approval and rewrite the product's rating aggregate in one
    /// transaction.
    async fn set_approval(
        &self,
        id: &ReviewId,
        approved: bool,
        summary: RatingSummary,
    ) -> Result<(), StoreError>;

    /// All reviews for moderation, newest first.
    async fn list_all(&self, page: PageRequest) -> Result<Page<Review>, StoreError>;
}

/// Registration payload.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// Login payload.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Driving port for registration, login, and identity resolution.
#[async_trait]
pub trait AuthOps: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<User, Error>;

    /// Verify credentials and stamp the login time.
    async fn login(&self, request: LoginRequest) -> Result<User, Error>;

    /// Resolve a session-stored user id into an acting identity.
    async fn identity_for(&self, user_id: UserId) -> Result<Identity, Error>;

    /// Fetch the account behind a session-stored user id.
    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;

    /// Admin-only user listing.
    async fn list_users(&self, identity: Identity, page: PageRequest)
        -> Result<Page<User>, Error>;
}

/// Product detail bundle for the detail endpoint.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
    pub similar: Vec<Product>,
    /// Quantity of this product already in the caller's cart, if any.
    pub cart_quantity: Option<u32>,
}

/// Storefront landing bundle.
#[derive(Debug, Clone)]
pub struct Storefront {
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Driving port for customer-facing catalog reads.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn storefront(&self) -> Result<Storefront, Error>;

    async fn list_categories(&self) -> Result<Vec<Category>, Error>;

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error>;

    async fn product_detail(
        &self,
        id: ProductId,
        identity: Identity,
    ) -> Result<ProductDetail, Error>;
}

/// Driving port for admin catalog maintenance.
#[async_trait]
pub trait CatalogAdmin: Send + Sync {
    async fn create_category(
        &self,
        identity: Identity,
        input: CategoryInput,
    ) -> Result<Category, Error>;

    async fn update_category(
        &self,
        identity: Identity,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<Category, Error>;

    async fn create_product(
        &self,
        identity: Identity,
        input: ProductInput,
    ) -> Result<Product, Error>;

    async fn update_product(
        &self,
        identity: Identity,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, Error>;
}

/// Admin category create/update payload.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Admin product create/update payload.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub shipping_fee: f64,
    pub commission_fee: f64,
    pub tax_fee: f64,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Materialised cart for responses: lines plus derived totals.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: f64,
    pub item_count: u32,
}

/// Driving port for cart mutation and reads.
#[async_trait]
pub trait CartOps: Send + Sync {
    /// Add to the cart, merging into an existing row for the same product.
    async fn add(
        &self,
        identity: Identity,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartView, Error>;

    /// Replace one row's quantity.
    async fn update(
        &self,
        identity: Identity,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartView, Error>;

    async fn remove(&self, identity: Identity, item: CartItemId) -> Result<CartView, Error>;

    async fn clear(&self, identity: Identity) -> Result<(), Error>;

    async fn view(&self, identity: Identity) -> Result<CartView, Error>;

    /// Total quantity across rows, for the cart badge.
    async fn count(&self, identity: Identity) -> Result<u32, Error>;
}

/// Checkout preview: the cart lines and the quoted totals.
#[derive(Debug, Clone)]
pub struct CheckoutPreview {
    pub lines: Vec<CartLine>,
    pub quote: CheckoutQuote,
}

/// Order placement payload.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub shipping_address: String,
    pub billing_address: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// Driving port for checkout and order tracking.
#[async_trait]
pub trait CheckoutOps: Send + Sync {
    /// Validate the cart and quote totals without writing anything.
    async fn preview(&self, identity: Identity) -> Result<CheckoutPreview, Error>;

    /// The full cart-to-order transition.
    async fn place_order(
        &self,
        identity: Identity,
        request: PlaceOrderRequest,
    ) -> Result<Order, Error>;

    async fn my_orders(&self, identity: Identity, page: PageRequest)
        -> Result<Page<Order>, Error>;

    async fn get_order(&self, identity: Identity, id: OrderId) -> Result<Order, Error>;

    /// Customer cancellation; only Pending orders qualify.
    async fn cancel(&self, identity: Identity, id: OrderId) -> Result<Order, Error>;

    /// Admin-only listing across all users.
    async fn list_orders(
        &self,
        identity: Identity,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, Error>;

    /// Admin-only status edit; bypasses the transition guard.
    async fn set_status(
        &self,
        identity: Identity,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, Error>;
}

/// Review submission payload.
#[derive(Debug, Clone)]
pub struct AddReviewRequest {
    pub product_id: ProductId,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Driving port for reviews and moderation.
#[async_trait]
pub trait ReviewOps: Send + Sync {
    async fn add_review(
        &self,
        identity: Identity,
        request: AddReviewRequest,
    ) -> Result<Review, Error>;

    /// Admin-only moderation listing.
    async fn list_reviews(
        &self,
        identity: Identity,
        page: PageRequest,
    ) -> Result<Page<Review>, Error>;

    /// Admin-only approval toggle; recomputes the product aggregate.
    async fn set_approval(
        &self,
        identity: Identity,
        id: ReviewId,
        approved: bool,
    ) -> Result<Review, Error>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn store_errors_map_to_domain_codes() {
        let err: Error = StoreError::connection("refused").into();
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

        let err: Error = StoreError::query("bad sql").into();
        assert_eq!(err.code(), ErrorCode::InternalError);

        let err: Error = StoreError::conflict("username taken").into();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    fn place_order_error_wraps_store_errors() {
        let err = PlaceOrderError::from(StoreError::query("boom"));
        assert!(matches!(err, PlaceOrderError::Store(StoreError::Query { .. })));
        assert!(err.to_string().contains("boom"));
    }

    #[rstest]
    fn default_filter_sorts_by_name() {
        let filter = ProductFilter::default();
        assert_eq!(filter.sort, ProductSort::Name);
        assert!(!filter.only_active);
        assert!(ProductFilter::active().only_active);
    }
}

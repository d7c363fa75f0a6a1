//! Back-office HTTP handlers.
//!
//! ```text
//! GET  /api/v1/admin/users
//! GET  /api/v1/admin/orders
//! PUT  /api/v1/admin/orders/{id}/status
//! GET  /api/v1/admin/reviews
//! PUT  /api/v1/admin/reviews/{id}/approval
//! POST /api/v1/admin/categories
//! PUT  /api/v1/admin/categories/{id}
//! POST /api/v1/admin/products
//! PUT  /api/v1/admin/products/{id}
//! ```
//!
//! Authorisation happens in the domain services; these handlers only
//! resolve the session and shape payloads.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{CategoryInput, OrderFilter, ProductInput};
use crate::domain::{CategoryId, Error, OrderId, ProductId, ReviewId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CategoryResponse, OrderResponse, PageResponse, ProductResponse, ReviewResponse, UserResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{page_from_query, parse_order_status};

/// Paging query for the admin listings.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paging plus status filter for the order listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderQuery {
    /// Wire name of an order status, e.g. `pending` or `shipped`.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Body for the admin order status edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusBody {
    pub status: String,
}

/// Body for the review approval toggle.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApprovalBody {
    pub approved: bool,
}

/// Category create/update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to active when omitted.
    pub is_active: Option<bool>,
}

impl From<CategoryBody> for CategoryInput {
    fn from(body: CategoryBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            is_active: body.is_active.unwrap_or(true),
        }
    }
}

/// Product create/update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: f64,
    #[serde(default = "default_commission_fee")]
    pub commission_fee: f64,
    #[serde(default = "default_tax_fee")]
    pub tax_fee: f64,
    pub stock_quantity: u32,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

fn default_shipping_fee() -> f64 {
    14.99
}

fn default_commission_fee() -> f64 {
    5.0
}

fn default_tax_fee() -> f64 {
    20.0
}

impl From<ProductBody> for ProductInput {
    fn from(body: ProductBody) -> Self {
        Self {
            category_id: CategoryId::from_uuid(body.category_id),
            name: body.name,
            description: body.description,
            brand: body.brand,
            image_url: body.image_url,
            price: body.price,
            original_price: body.original_price,
            shipping_fee: body.shipping_fee,
            commission_fee: body.commission_fee,
            tax_fee: body.tax_fee,
            stock_quantity: body.stock_quantity,
            is_active: body.is_active.unwrap_or(true),
            is_featured: body.is_featured.unwrap_or(false),
        }
    }
}

/// List all accounts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(AdminListQuery),
    responses(
        (status = 200, description = "One page of accounts", body = PageResponse<UserResponse>),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<PageResponse<UserResponse>>> {
    let identity = state.require_identity(&session).await?;
    let page = page_from_query(query.page, query.per_page)?;
    let users = state.auth.list_users(identity, page).await?;
    Ok(web::Json(PageResponse::from_page(users, UserResponse::from)))
}

/// List orders across all accounts, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(AdminOrderQuery),
    responses(
        (status = 200, description = "One page of orders", body = PageResponse<OrderResponse>),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListOrders"
)]
#[get("/admin/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminOrderQuery>,
) -> ApiResult<web::Json<PageResponse<OrderResponse>>> {
    let identity = state.require_identity(&session).await?;
    let status = query.status.as_deref().map(parse_order_status).transpose()?;
    let page = page_from_query(query.page, query.per_page)?;
    let orders = state
        .checkout
        .list_orders(identity, OrderFilter { status }, page)
        .await?;
    Ok(web::Json(PageResponse::from_page(orders, OrderResponse::from)))
}

/// Set an order's status directly.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = OrderStatusBody,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "No such order", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetOrderStatus"
)]
#[put("/admin/orders/{id}/status")]
pub async fn set_order_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<OrderStatusBody>,
) -> ApiResult<web::Json<OrderResponse>> {
    let identity = state.require_identity(&session).await?;
    let status = parse_order_status(&payload.status)?;
    let order = state
        .checkout
        .set_status(identity, OrderId::from_uuid(path.into_inner()), status)
        .await?;
    Ok(web::Json(OrderResponse::from(order)))
}

/// List every review for moderation.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reviews",
    params(AdminListQuery),
    responses(
        (status = 200, description = "One page of reviews", body = PageResponse<ReviewResponse>),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListReviews"
)]
#[get("/admin/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<PageResponse<ReviewResponse>>> {
    let identity = state.require_identity(&session).await?;
    let page = page_from_query(query.page, query.per_page)?;
    let reviews = state.reviews.list_reviews(identity, page).await?;
    Ok(web::Json(PageResponse::from_page(reviews, ReviewResponse::from)))
}

/// Approve or pull a review, recomputing the product aggregate.
#[utoipa::path(
    put,
    path = "/api/v1/admin/reviews/{id}/approval",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = ReviewApprovalBody,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "No such review", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetReviewApproval"
)]
#[put("/admin/reviews/{id}/approval")]
pub async fn set_review_approval(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewApprovalBody>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let identity = state.require_identity(&session).await?;
    let review = state
        .reviews
        .set_approval(
            identity,
            ReviewId::from_uuid(path.into_inner()),
            payload.approved,
        )
        .await?;
    Ok(web::Json(ReviewResponse::from(review)))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = CategoryBody,
    responses(
        (status = 201, description = "Created category", body = CategoryResponse),
        (status = 400, description = "Invalid category", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateCategory"
)]
#[post("/admin/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CategoryBody>,
) -> ApiResult<HttpResponse> {
    let identity = state.require_identity(&session).await?;
    let category = state
        .catalog_admin
        .create_category(identity, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// Update a category.
#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryBody,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Invalid category", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "No such category", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateCategory"
)]
#[put("/admin/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CategoryBody>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let identity = state.require_identity(&session).await?;
    let category = state
        .catalog_admin
        .update_category(
            identity,
            CategoryId::from_uuid(path.into_inner()),
            payload.into_inner().into(),
        )
        .await?;
    Ok(web::Json(CategoryResponse::from(category)))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = ProductBody,
    responses(
        (status = 201, description = "Created product", body = ProductResponse),
        (status = 400, description = "Invalid product or unknown category", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateProduct"
)]
#[post("/admin/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProductBody>,
) -> ApiResult<HttpResponse> {
    let identity = state.require_identity(&session).await?;
    let product = state
        .catalog_admin
        .create_product(identity, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// Update a product.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductBody,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Invalid product or unknown category", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "No such product", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateProduct"
)]
#[put("/admin/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ProductBody>,
) -> ApiResult<web::Json<ProductResponse>> {
    let identity = state.require_identity(&session).await?;
    let product = state
        .catalog_admin
        .update_product(
            identity,
            ProductId::from_uuid(path.into_inner()),
            payload.into_inner().into(),
        )
        .await?;
    Ok(web::Json(ProductResponse::from(product)))
}

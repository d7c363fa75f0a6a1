//! Customer-facing catalog HTTP handlers.
//!
//! ```text
//! GET /api/v1/storefront
//! GET /api/v1/categories
//! GET /api/v1/products
//! GET /api/v1/products/{id}
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{ProductFilter, ProductSort};
use crate::domain::{CategoryId, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CategoryResponse, PageResponse, ProductResponse, ReviewResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_from_query;

/// Storefront landing payload: featured products plus the category tree.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontResponse {
    pub featured: Vec<ProductResponse>,
    pub categories: Vec<CategoryResponse>,
}

/// Product detail payload with its reviews and suggestions.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailResponse {
    pub product: ProductResponse,
    pub reviews: Vec<ReviewResponse>,
    pub similar: Vec<ProductResponse>,
    /// Quantity of this product already in the caller's cart, if any.
    pub cart_quantity: Option<u32>,
}

/// Query parameters accepted by the product listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<Uuid>,
    /// Substring match over name, description, and brand.
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// One of `name`, `price_asc`, `price_desc`, `rating`, `newest`.
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn parse_sort(value: &str) -> Result<ProductSort, Error> {
    match value {
        "name" => Ok(ProductSort::Name),
        "price_asc" => Ok(ProductSort::PriceAsc),
        "price_desc" => Ok(ProductSort::PriceDesc),
        "rating" => Ok(ProductSort::Rating),
        "newest" => Ok(ProductSort::Newest),
        other => Err(Error::invalid_request(format!("unknown sort '{other}'"))),
    }
}

fn filter_from_query(query: &ProductListQuery) -> Result<ProductFilter, Error> {
    let sort = match query.sort.as_deref() {
        Some(value) => parse_sort(value)?,
        None => ProductSort::default(),
    };
    Ok(ProductFilter {
        category: query.category.map(CategoryId::from_uuid),
        query: query.q.clone().filter(|q| !q.trim().is_empty()),
        min_price: query.min_price,
        max_price: query.max_price,
        only_active: true,
        sort,
    })
}

/// Fetch the storefront landing bundle.
#[utoipa::path(
    get,
    path = "/api/v1/storefront",
    responses((status = 200, description = "Featured products and categories", body = StorefrontResponse)),
    tags = ["catalog"],
    operation_id = "storefront"
)]
#[get("/storefront")]
pub async fn storefront(state: web::Data<HttpState>) -> ApiResult<web::Json<StorefrontResponse>> {
    let bundle = state.catalog.storefront().await?;
    Ok(web::Json(StorefrontResponse {
        featured: bundle.featured.into_iter().map(ProductResponse::from).collect(),
        categories: bundle
            .categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect(),
    }))
}

/// List the active categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Active categories", body = [CategoryResponse])),
    tags = ["catalog"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// List, search, and filter active products.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = PageResponse<ProductResponse>),
        (status = 400, description = "Invalid filter or page", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<web::Json<PageResponse<ProductResponse>>> {
    let filter = filter_from_query(&query)?;
    let page = page_from_query(query.page, query.per_page)?;
    let products = state.catalog.list_products(filter, page).await?;
    Ok(web::Json(PageResponse::from_page(
        products,
        ProductResponse::from,
    )))
}

/// Fetch one product with its reviews, similar products, and cart state.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = ProductDetailResponse),
        (status = 404, description = "No such product", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "productDetail"
)]
#[get("/products/{id}")]
pub async fn product_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProductDetailResponse>> {
    let identity = state.identity(&session).await?;
    let detail = state
        .catalog
        .product_detail(ProductId::from_uuid(path.into_inner()), identity)
        .await?;
    Ok(web::Json(ProductDetailResponse {
        product: ProductResponse::from(detail.product),
        reviews: detail.reviews.into_iter().map(ReviewResponse::from).collect(),
        similar: detail.similar.into_iter().map(ProductResponse::from).collect(),
        cart_quantity: detail.cart_quantity,
    }))
}

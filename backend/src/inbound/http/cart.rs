//! Shopping cart HTTP handlers.
//!
//! ```text
//! GET    /api/v1/cart
//! GET    /api/v1/cart/count
//! POST   /api/v1/cart/items
//! PUT    /api/v1/cart/items/{id}
//! DELETE /api/v1/cart/items/{id}
//! DELETE /api/v1/cart
//! ```
//!
//! Every route needs an authenticated session; guests get 401.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CartItemId, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::CartViewResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for adding a product to the cart.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub product_id: Uuid,
    /// Defaults to one when omitted.
    pub quantity: Option<u32>,
}

/// Body for replacing one line's quantity.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemBody {
    pub quantity: u32,
}

/// Cart badge payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartCountResponse {
    pub count: u32,
}

/// Fetch the caller's cart with derived totals.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "The cart", body = CartViewResponse),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["cart"],
    operation_id = "viewCart"
)]
#[get("/cart")]
pub async fn view_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CartViewResponse>> {
    let identity = state.require_identity(&session).await?;
    let view = state.carts.view(identity).await?;
    Ok(web::Json(CartViewResponse::from(view)))
}

/// Total quantity across cart lines, for the badge.
#[utoipa::path(
    get,
    path = "/api/v1/cart/count",
    responses(
        (status = 200, description = "Item count", body = CartCountResponse),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["cart"],
    operation_id = "cartCount"
)]
#[get("/cart/count")]
pub async fn cart_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CartCountResponse>> {
    let identity = state.require_identity(&session).await?;
    let count = state.carts.count(identity).await?;
    Ok(web::Json(CartCountResponse { count }))
}

/// Add a product to the cart, merging into an existing line.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddItemBody,
    responses(
        (status = 200, description = "Updated cart", body = CartViewResponse),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such product", body = Error),
        (status = 409, description = "Not enough stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addCartItem"
)]
#[post("/cart/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddItemBody>,
) -> ApiResult<web::Json<CartViewResponse>> {
    let identity = state.require_identity(&session).await?;
    let body = payload.into_inner();
    let view = state
        .carts
        .add(
            identity,
            ProductId::from_uuid(body.product_id),
            body.quantity.unwrap_or(1),
        )
        .await?;
    Ok(web::Json(CartViewResponse::from(view)))
}

/// Replace one line's quantity.
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item id")),
    request_body = UpdateItemBody,
    responses(
        (status = 200, description = "Updated cart", body = CartViewResponse),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such cart item", body = Error),
        (status = 409, description = "Not enough stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "updateCartItem"
)]
#[put("/cart/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateItemBody>,
) -> ApiResult<web::Json<CartViewResponse>> {
    let identity = state.require_identity(&session).await?;
    let view = state
        .carts
        .update(
            identity,
            CartItemId::from_uuid(path.into_inner()),
            payload.quantity,
        )
        .await?;
    Ok(web::Json(CartViewResponse::from(view)))
}

/// Remove one line from the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Updated cart", body = CartViewResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such cart item", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CartViewResponse>> {
    let identity = state.require_identity(&session).await?;
    let view = state
        .carts
        .remove(identity, CartItemId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(CartViewResponse::from(view)))
}

/// Empty the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let identity = state.require_identity(&session).await?;
    state.carts.clear(identity).await?;
    Ok(HttpResponse::NoContent().finish())
}

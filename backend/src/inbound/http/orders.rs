//! Checkout and order tracking HTTP handlers.
//!
//! ```text
//! GET  /api/v1/checkout/preview
//! POST /api/v1/orders
//! GET  /api/v1/orders
//! GET  /api/v1/orders/{id}
//! POST /api/v1/orders/{id}/cancel
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::PlaceOrderRequest;
use crate::domain::{Error, OrderId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    CartLineResponse, OrderResponse, PageResponse, QuoteResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_from_query;

/// Checkout preview payload: the cart lines and the quoted totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPreviewResponse {
    pub lines: Vec<CartLineResponse>,
    pub quote: QuoteResponse,
}

/// Order placement body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub shipping_address: String,
    pub billing_address: Option<String>,
    /// Defaults to cash on delivery when omitted.
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Paging query shared by the order listings.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Quote the cart without writing anything.
#[utoipa::path(
    get,
    path = "/api/v1/checkout/preview",
    responses(
        (status = 200, description = "Cart lines and totals", body = CheckoutPreviewResponse),
        (status = 400, description = "The cart is empty", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["orders"],
    operation_id = "checkoutPreview"
)]
#[get("/checkout/preview")]
pub async fn checkout_preview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CheckoutPreviewResponse>> {
    let identity = state.require_identity(&session).await?;
    let preview = state.checkout.preview(identity).await?;
    Ok(web::Json(CheckoutPreviewResponse {
        lines: preview.lines.into_iter().map(CartLineResponse::from).collect(),
        quote: QuoteResponse::from(preview.quote),
    }))
}

/// Turn the cart into an order.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty cart or missing address", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 409, description = "Stock ran out since carting", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PlaceOrderBody>,
) -> ApiResult<HttpResponse> {
    let identity = state.require_identity(&session).await?;
    let body = payload.into_inner();
    let order = state
        .checkout
        .place_order(
            identity,
            PlaceOrderRequest {
                shipping_address: body.shipping_address,
                billing_address: body.billing_address,
                payment_method: body
                    .payment_method
                    .unwrap_or_else(|| "cash_on_delivery".to_owned()),
                notes: body.notes,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// List the caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "One page of orders", body = PageResponse<OrderResponse>),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["orders"],
    operation_id = "myOrders"
)]
#[get("/orders")]
pub async fn my_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrderListQuery>,
) -> ApiResult<web::Json<PageResponse<OrderResponse>>> {
    let identity = state.require_identity(&session).await?;
    let page = page_from_query(query.page, query.per_page)?;
    let orders = state.checkout.my_orders(identity, page).await?;
    Ok(web::Json(PageResponse::from_page(orders, OrderResponse::from)))
}

/// Fetch one of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such order for this account", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponse>> {
    let identity = state.require_identity(&session).await?;
    let order = state
        .checkout
        .get_order(identity, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(OrderResponse::from(order)))
}

/// Cancel a pending order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such order for this account", body = Error),
        (status = 409, description = "The order is past cancellation", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponse>> {
    let identity = state.require_identity(&session).await?;
    let order = state
        .checkout
        .cancel(identity, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(OrderResponse::from(order)))
}

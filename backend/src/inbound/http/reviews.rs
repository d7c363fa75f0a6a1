//! Review submission HTTP handler.
//!
//! ```text
//! POST /api/v1/products/{id}/reviews
//! ```
//!
//! Moderation lives under the admin routes; new reviews start approved and
//! count towards the product aggregate until an admin pulls them.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::AddReviewRequest;
use crate::domain::{Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ReviewResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Review submission body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewBody {
    /// Stars from 1 to 5.
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Submit a review for a product.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = AddReviewBody,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Rating out of range", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "No such product", body = Error),
        (status = 409, description = "Already reviewed by this account", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "addReview"
)]
#[post("/products/{id}/reviews")]
pub async fn add_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AddReviewBody>,
) -> ApiResult<HttpResponse> {
    let identity = state.require_identity(&session).await?;
    let body = payload.into_inner();
    let review = state
        .reviews
        .add_review(
            identity,
            AddReviewRequest {
                product_id: ProductId::from_uuid(path.into_inner()),
                rating: body.rating,
                title: body.title,
                comment: body.comment,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

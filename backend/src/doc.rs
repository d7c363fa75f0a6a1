//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated OpenAPI specification for the REST API:
//! every inbound HTTP path, the shared response schemas, and the session
//! cookie security scheme. Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::error::{Error, ErrorCode};
use crate::domain::order::{OrderStatus, PaymentStatus};
use crate::inbound::http::schemas::{
    CartLineResponse, CartViewResponse, CategoryResponse, OrderItemResponse, OrderResponse,
    ProductResponse, QuoteResponse, ReviewResponse, UserResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Shop backend API",
        description = "HTTP interface for the storefront, cart, checkout, and back office."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::catalog::storefront,
        crate::inbound::http::catalog::list_categories,
        crate::inbound::http::catalog::list_products,
        crate::inbound::http::catalog::product_detail,
        crate::inbound::http::cart::view_cart,
        crate::inbound::http::cart::cart_count,
        crate::inbound::http::cart::add_item,
        crate::inbound::http::cart::update_item,
        crate::inbound::http::cart::remove_item,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::orders::checkout_preview,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::my_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::reviews::add_review,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::list_orders,
        crate::inbound::http::admin::set_order_status,
        crate::inbound::http::admin::list_reviews,
        crate::inbound::http::admin::set_review_approval,
        crate::inbound::http::admin::create_category,
        crate::inbound::http::admin::update_category,
        crate::inbound::http::admin::create_product,
        crate::inbound::http::admin::update_product,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        OrderStatus,
        PaymentStatus,
        UserResponse,
        CategoryResponse,
        ProductResponse,
        CartLineResponse,
        CartViewResponse,
        QuoteResponse,
        OrderItemResponse,
        OrderResponse,
        ReviewResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session state"),
        (name = "catalog", description = "Storefront browsing and search"),
        (name = "cart", description = "Shopping cart operations"),
        (name = "orders", description = "Checkout and order tracking"),
        (name = "reviews", description = "Product reviews"),
        (name = "admin", description = "Back-office maintenance"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn the_error_schema_carries_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn every_tagged_group_has_at_least_one_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.keys().any(|p| p.starts_with("/api/v1/auth")));
        assert!(doc.paths.paths.keys().any(|p| p.starts_with("/api/v1/admin")));
        assert!(doc.paths.paths.keys().any(|p| p.starts_with("/health")));
    }
}

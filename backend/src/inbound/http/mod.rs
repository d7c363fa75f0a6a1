//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod health;
pub mod orders;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod validation;

pub use error::ApiResult;

/// Register every API route on a scope, typically `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_user)
        .service(catalog::storefront)
        .service(catalog::list_categories)
        .service(catalog::list_products)
        .service(catalog::product_detail)
        .service(cart::view_cart)
        .service(cart::cart_count)
        .service(cart::add_item)
        .service(cart::update_item)
        .service(cart::remove_item)
        .service(cart::clear_cart)
        .service(orders::checkout_preview)
        .service(orders::place_order)
        .service(orders::my_orders)
        .service(orders::get_order)
        .service(orders::cancel_order)
        .service(reviews::add_review)
        .service(admin::list_users)
        .service(admin::list_orders)
        .service(admin::set_order_status)
        .service(admin::list_reviews)
        .service(admin::set_review_approval)
        .service(admin::create_category)
        .service(admin::update_category)
        .service(admin::create_product)
        .service(admin::update_product);
}

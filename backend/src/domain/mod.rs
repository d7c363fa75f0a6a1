//! Domain entities, invariants, and use-case services.
//!
//! Everything here is transport and storage agnostic. Services receive the
//! acting [`Identity`] and repository handles explicitly; the HTTP adapter
//! maps [`Error`] values into response envelopes.

pub mod auth_service;
pub mod cart;
pub mod cart_service;
pub mod catalog;
pub mod catalog_service;
pub mod checkout_service;
pub mod error;
pub mod identity;
pub mod ids;
pub mod order;
pub mod password;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod user;

pub use self::auth_service::AuthService;
pub use self::cart_service::CartService;
pub use self::catalog_service::CatalogService;
pub use self::checkout_service::CheckoutService;
pub use self::error::{Error, ErrorCode};
pub use self::identity::Identity;
pub use self::ids::{CartItemId, CategoryId, OrderId, ProductId, ReviewId, UserId};
pub use self::review_service::ReviewService;

//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each adapter implements one domain repository port and only translates
//! between Diesel row structs and domain types; no business logic lives here.
//! Connections come from a `bb8` pool over `diesel-async`, and every database
//! error is mapped to the domain's [`StoreError`](crate::domain::ports::StoreError).

mod diesel_cart_repository;
mod diesel_catalog_repository;
mod diesel_order_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

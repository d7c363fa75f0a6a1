//! Backend entry-point: wires the HTTP adapter onto the domain services and
//! the Postgres-backed repositories.

use std::env;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, web};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::Trace;
use backend::domain::{
    AuthService, CartService, CatalogService, CheckoutService, ReviewService,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::configure_api;
use backend::outbound::persistence::{
    DbPool, DieselCartRepository, DieselCatalogRepository, DieselOrderRepository,
    DieselReviewRepository, DieselUserRepository, PoolConfig,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = session_settings_from_env(BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let database_url =
        env::var("DATABASE_URL").map_err(|_| std::io::Error::other("DATABASE_URL not set"))?;
    run_migrations(&database_url)?;

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)?;
    let state = build_state(&pool);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(session_middleware(&settings))
            .configure(configure_api);

        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(&bind_addr)?;

    health_state.mark_ready();
    info!(addr = %bind_addr, "listening");
    server.run().await
}

/// Apply pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied migrations");
    }
    Ok(())
}

/// Assemble the domain services over the Postgres repositories.
fn build_state(pool: &DbPool) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let catalog = Arc::new(DieselCatalogRepository::new(pool.clone()));
    let carts = Arc::new(DieselCartRepository::new(pool.clone()));
    let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
    let reviews = Arc::new(DieselReviewRepository::new(pool.clone()));

    HttpState {
        auth: Arc::new(AuthService::new(users)),
        catalog: Arc::new(CatalogService::new(
            Arc::clone(&catalog),
            Arc::clone(&carts),
            Arc::clone(&reviews),
        )),
        catalog_admin: Arc::new(CatalogService::new(
            Arc::clone(&catalog),
            Arc::clone(&carts),
            Arc::clone(&reviews),
        )),
        carts: Arc::new(CartService::new(Arc::clone(&carts), Arc::clone(&catalog))),
        checkout: Arc::new(CheckoutService::new(Arc::clone(&carts), orders)),
        reviews: Arc::new(ReviewService::new(reviews, catalog)),
    }
}

/// Cookie-session middleware over the validated session settings.
fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(settings.same_site)
        .build()
}

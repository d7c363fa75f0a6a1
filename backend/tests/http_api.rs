//! End-to-end tests driving the HTTP adapter over in-memory repositories.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use backend::domain::{
    AuthService, CartService, CatalogService, CheckoutService, ProductId, ReviewService,
};
use backend::inbound::http::configure_api;
use backend::inbound::http::state::HttpState;
use backend::test_support::{MemoryStore, category_fixture, product_fixture, user_fixture};

struct Harness {
    store: Arc<MemoryStore>,
    state: HttpState,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let category = category_fixture("Elektronik");
    let product = product_fixture(&category, "Telefon", 100.0, 5);
    store.seed_category(category);
    store.seed_product(product);
    store.seed_user(user_fixture("ayse", "sifre123", false));
    store.seed_user(user_fixture("patron", "sifre123", true));

    let state = HttpState {
        auth: Arc::new(AuthService::new(Arc::clone(&store))),
        catalog: Arc::new(CatalogService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
        )),
        catalog_admin: Arc::new(CatalogService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
        )),
        carts: Arc::new(CartService::new(Arc::clone(&store), Arc::clone(&store))),
        checkout: Arc::new(CheckoutService::new(Arc::clone(&store), Arc::clone(&store))),
        reviews: Arc::new(ReviewService::new(Arc::clone(&store), Arc::clone(&store))),
    };
    Harness { store, state }
}

macro_rules! spawn_app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.state.clone()))
                .service(
                    web::scope("/api/v1")
                        .wrap(
                            SessionMiddleware::builder(
                                CookieSessionStore::default(),
                                Key::generate(),
                            )
                            .cookie_secure(false)
                            .build(),
                        )
                        .configure(configure_api),
                ),
        )
        .await
    };
}

macro_rules! login_cookie {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": $username, "password": "sifre123" }))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "login should succeed");
        session_cookie(res.response())
    }};
}

fn session_cookie(response: &actix_web::HttpResponse) -> Cookie<'static> {
    response
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
        .expect("session cookie")
}

#[rstest]
#[actix_rt::test]
async fn browsing_needs_no_session(harness: Harness) {
    let app = spawn_app!(harness);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/storefront").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/products?q=telefon")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["totalItems"], json!(1));
}

#[rstest]
#[actix_rt::test]
async fn the_cart_rejects_guests(harness: Harness) {
    let app = spawn_app!(harness);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/cart").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("unauthorized"));
}

#[rstest]
#[actix_rt::test]
async fn registration_logs_the_account_in(harness: Harness) {
    let app = spawn_app!(harness);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "username": "yeni", "password": "sifre123" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(res.response());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["username"], json!("yeni"));
}

#[rstest]
#[actix_rt::test]
async fn a_purchase_flows_from_cart_to_order(harness: Harness) {
    let app = spawn_app!(harness);
    let cookie = login_cookie!(app, "ayse");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/products").to_request(),
    )
    .await;
    let listing: Value = test::read_body_json(res).await;
    let product_id = listing["items"][0]["id"].as_str().expect("id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .cookie(cookie.clone())
            .set_json(json!({ "productId": product_id, "quantity": 2 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cart: Value = test::read_body_json(res).await;
    assert_eq!(cart["itemCount"], json!(2));
    assert_eq!(cart["total"], json!(200.0));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/orders")
            .cookie(cookie.clone())
            .set_json(json!({ "shippingAddress": "Mahalle 1, Istanbul" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(res).await;
    assert_eq!(order["status"], json!("pending"));
    assert_eq!(order["totalAmount"], json!(200.0));
    assert!(order["orderNumber"].as_str().expect("number").starts_with("TR"));

    // Stock was decremented and the cart emptied.
    let parsed = uuid::Uuid::parse_str(&product_id).expect("uuid");
    assert_eq!(
        harness.store.stock_of(&ProductId::from_uuid(parsed)),
        Some(3)
    );
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/cart/count")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let count: Value = test::read_body_json(res).await;
    assert_eq!(count["count"], json!(0));
}

#[rstest]
#[actix_rt::test]
async fn admin_routes_turn_customers_away(harness: Harness) {
    let app = spawn_app!(harness);
    let cookie = login_cookie!(app, "ayse");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/orders")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_rt::test]
async fn admins_manage_the_catalog_over_http(harness: Harness) {
    let app = spawn_app!(harness);
    let cookie = login_cookie!(app, "patron");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/categories")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Kitap" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let category: Value = test::read_body_json(res).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/products")
            .cookie(cookie)
            .set_json(json!({
                "categoryId": category["id"],
                "name": "Roman",
                "price": 35.0,
                "stockQuantity": 10
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: Value = test::read_body_json(res).await;
    assert_eq!(product["inStock"], json!(true));

    // Omitted fee fields fall back to the stock pricing defaults:
    // commission 5%, tax 20%, shipping 14.99.
    let final_price = product["finalPrice"].as_f64().expect("final price");
    assert!((final_price - 57.34).abs() < 1e-9);
}

#[rstest]
#[actix_rt::test]
async fn an_unknown_status_is_a_bad_request(harness: Harness) {
    let app = spawn_app!(harness);
    let cookie = login_cookie!(app, "patron");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/orders?status=teleported")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

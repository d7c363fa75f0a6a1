use std::sync::Arc;

use rstest::{fixture, rstest};

use super::CatalogService;
use crate::domain::catalog::{Category, Product};
use crate::domain::ports::{
    CartOps, CatalogAdmin, CatalogQuery, CategoryInput, ProductFilter, ProductInput, ProductSort,
    ReviewOps,
};
use crate::domain::user::User;
use crate::domain::{CartService, CategoryId, ErrorCode, Identity, ProductId, ReviewService};
use crate::test_support::{category_fixture, product_fixture, user_fixture, MemoryStore};
use pagination::PageRequest;

struct Harness {
    store: Arc<MemoryStore>,
    service: CatalogService<MemoryStore, MemoryStore, MemoryStore>,
    customer: User,
    admin: User,
    category: Category,
    product: Product,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let category = category_fixture("Elektronik");
    let product = product_fixture(&category, "Kulaklik", 45.0, 5);
    let customer = user_fixture("ayse", "sifre123", false);
    let admin = user_fixture("yonetici", "gizli12", true);
    store.seed_category(category.clone());
    store.seed_product(product.clone());
    store.seed_user(customer.clone());
    store.seed_user(admin.clone());
    let service = CatalogService::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&store));
    Harness {
        store,
        service,
        customer,
        admin,
        category,
        product,
    }
}

impl Harness {
    fn admin_identity(&self) -> Identity {
        Identity::admin(self.admin.id())
    }

    fn product_input(&self, name: &str, price: f64) -> ProductInput {
        ProductInput {
            category_id: self.category.id(),
            name: name.to_owned(),
            description: None,
            brand: Some("Akme".to_owned()),
            image_url: None,
            price,
            original_price: None,
            shipping_fee: 14.99,
            commission_fee: 5.0,
            tax_fee: 20.0,
            stock_quantity: 10,
            is_active: true,
            is_featured: false,
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn the_storefront_bundles_featured_products_and_categories(harness: Harness) {
    let mut input = harness.product_input("Hoparlor", 80.0);
    input.is_featured = true;
    harness
        .service
        .create_product(harness.admin_identity(), input)
        .await
        .expect("product created");

    let storefront = harness.service.storefront().await.expect("storefront");
    assert_eq!(storefront.featured.len(), 1);
    assert_eq!(storefront.featured[0].name(), "Hoparlor");
    assert_eq!(storefront.categories.len(), 1);
}

#[rstest]
#[actix_rt::test]
async fn listings_hide_inactive_products(harness: Harness) {
    let mut input = harness.product_input("Eski Model", 10.0);
    input.is_active = false;
    harness
        .service
        .create_product(harness.admin_identity(), input)
        .await
        .expect("product created");

    let page = harness
        .service
        .list_products(ProductFilter::active(), PageRequest::default())
        .await
        .expect("listing succeeds");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name(), "Kulaklik");
}

#[rstest]
#[actix_rt::test]
async fn search_matches_name_and_brand(harness: Harness) {
    harness
        .service
        .create_product(
            harness.admin_identity(),
            harness.product_input("Mikrofon", 60.0),
        )
        .await
        .expect("product created");

    let filter = ProductFilter {
        query: Some("akme".to_owned()),
        ..ProductFilter::active()
    };
    let page = harness
        .service
        .list_products(filter, PageRequest::default())
        .await
        .expect("search succeeds");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name(), "Mikrofon");
}

#[rstest]
#[actix_rt::test]
async fn price_sorting_orders_the_listing(harness: Harness) {
    harness
        .service
        .create_product(
            harness.admin_identity(),
            harness.product_input("Mikrofon", 60.0),
        )
        .await
        .expect("product created");

    let filter = ProductFilter {
        sort: ProductSort::PriceDesc,
        ..ProductFilter::active()
    };
    let page = harness
        .service
        .list_products(filter, PageRequest::default())
        .await
        .expect("listing succeeds");
    assert_eq!(page.items[0].name(), "Mikrofon");
    assert_eq!(page.items[1].name(), "Kulaklik");
}

#[rstest]
#[actix_rt::test]
async fn the_detail_bundles_reviews_similar_products_and_cart_state(harness: Harness) {
    harness
        .service
        .create_product(
            harness.admin_identity(),
            harness.product_input("Mikrofon", 60.0),
        )
        .await
        .expect("similar product created");

    let reviews = ReviewService::new(Arc::clone(&harness.store), Arc::clone(&harness.store));
    reviews
        .add_review(
            Identity::user(harness.customer.id()),
            crate::domain::ports::AddReviewRequest {
                product_id: harness.product.id(),
                rating: 4,
                title: None,
                comment: None,
            },
        )
        .await
        .expect("review accepted");

    let carts = CartService::new(Arc::clone(&harness.store), Arc::clone(&harness.store));
    carts
        .add(Identity::user(harness.customer.id()), harness.product.id(), 2)
        .await
        .expect("cart add succeeds");

    let detail = harness
        .service
        .product_detail(harness.product.id(), Identity::user(harness.customer.id()))
        .await
        .expect("detail succeeds");
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.similar.len(), 1);
    assert_eq!(detail.cart_quantity, Some(2));

    let guest_detail = harness
        .service
        .product_detail(harness.product.id(), Identity::guest())
        .await
        .expect("guest detail succeeds");
    assert_eq!(guest_detail.cart_quantity, None);
}

#[rstest]
#[actix_rt::test]
async fn unknown_product_detail_is_not_found(harness: Harness) {
    let err = harness
        .service
        .product_detail(ProductId::random(), Identity::guest())
        .await
        .expect_err("missing product rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[actix_rt::test]
async fn category_writes_are_admin_only(harness: Harness) {
    let input = CategoryInput {
        name: "Kitap".to_owned(),
        description: None,
        is_active: true,
    };

    let err = harness
        .service
        .create_category(Identity::user(harness.customer.id()), input.clone())
        .await
        .expect_err("customer rejected");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let category = harness
        .service
        .create_category(harness.admin_identity(), input)
        .await
        .expect("admin create succeeds");
    assert_eq!(category.name(), "Kitap");
}

#[rstest]
#[actix_rt::test]
async fn products_require_an_existing_category(harness: Harness) {
    let mut input = harness.product_input("Sandalye", 200.0);
    input.category_id = CategoryId::random();

    let err = harness
        .service
        .create_product(harness.admin_identity(), input)
        .await
        .expect_err("orphan product rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_rt::test]
async fn product_updates_keep_the_rating_aggregate(harness: Harness) {
    let reviews = ReviewService::new(Arc::clone(&harness.store), Arc::clone(&harness.store));
    reviews
        .add_review(
            Identity::user(harness.customer.id()),
            crate::domain::ports::AddReviewRequest {
                product_id: harness.product.id(),
                rating: 4,
                title: None,
                comment: None,
            },
        )
        .await
        .expect("review accepted");

    let updated = harness
        .service
        .update_product(
            harness.admin_identity(),
            harness.product.id(),
            harness.product_input("Kulaklik Pro", 55.0),
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.name(), "Kulaklik Pro");
    assert!((updated.rating() - 4.0).abs() < 1e-9);
    assert_eq!(updated.review_count(), 1);
}

#[rstest]
#[actix_rt::test]
async fn category_updates_preserve_the_creation_time(harness: Harness) {
    let updated = harness
        .service
        .update_category(
            harness.admin_identity(),
            harness.category.id(),
            CategoryInput {
                name: "Elektronik ve Aksesuar".to_owned(),
                description: Some("Guncellendi".to_owned()),
                is_active: true,
            },
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.created_at(), harness.category.created_at());
}

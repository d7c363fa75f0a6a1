use std::sync::Arc;

use rstest::{fixture, rstest};

use super::CartService;
use crate::domain::catalog::Product;
use crate::domain::ports::CartOps;
use crate::domain::user::User;
use crate::domain::{ErrorCode, Identity, ProductId};
use crate::test_support::{category_fixture, product_fixture, user_fixture, MemoryStore};

struct Harness {
    store: Arc<MemoryStore>,
    service: CartService<MemoryStore, MemoryStore>,
    customer: User,
    product: Product,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let category = category_fixture("Elektronik");
    let product = product_fixture(&category, "Kulaklik", 45.0, 5);
    let customer = user_fixture("ayse", "sifre123", false);
    store.seed_category(category);
    store.seed_product(product.clone());
    store.seed_user(customer.clone());
    let service = CartService::new(Arc::clone(&store), Arc::clone(&store));
    Harness {
        store,
        service,
        customer,
        product,
    }
}

impl Harness {
    fn identity(&self) -> Identity {
        Identity::user(self.customer.id())
    }
}

#[rstest]
#[actix_rt::test]
async fn add_creates_a_line_and_derives_totals(harness: Harness) {
    let view = harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("add succeeds");

    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.item_count, 2);
    assert!((view.total - 90.0).abs() < 1e-9);
}

#[rstest]
#[actix_rt::test]
async fn add_merges_into_the_existing_line(harness: Harness) {
    harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("first add succeeds");
    let view = harness
        .service
        .add(harness.identity(), harness.product.id(), 3)
        .await
        .expect("second add succeeds");

    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].item.quantity(), 5);
    assert_eq!(harness.store.cart_size(&harness.customer.id()), 1);
}

#[rstest]
#[actix_rt::test]
async fn a_merge_that_would_overflow_is_a_stock_failure(harness: Harness) {
    harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("first add succeeds");
    let err = harness
        .service
        .add(harness.identity(), harness.product.id(), u32::MAX - 1)
        .await
        .expect_err("overflowing merge rejected");

    assert_eq!(err.code(), ErrorCode::OutOfStock);
    let view = harness
        .service
        .view(harness.identity())
        .await
        .expect("view succeeds");
    assert_eq!(view.lines[0].item.quantity(), 2);
}

#[rstest]
#[actix_rt::test]
async fn merged_quantity_is_bounded_by_stock(harness: Harness) {
    harness
        .service
        .add(harness.identity(), harness.product.id(), 4)
        .await
        .expect("first add succeeds");
    let err = harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect_err("second add exceeds stock");

    assert_eq!(err.code(), ErrorCode::OutOfStock);
    let details = err.details().expect("stock details present");
    assert_eq!(details["available"], 5);
    assert_eq!(details["inCart"], 4);
}

#[rstest]
#[actix_rt::test]
async fn zero_quantity_is_rejected(harness: Harness) {
    let err = harness
        .service
        .add(harness.identity(), harness.product.id(), 0)
        .await
        .expect_err("zero quantity rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_rt::test]
async fn unknown_product_is_not_found(harness: Harness) {
    let err = harness
        .service
        .add(harness.identity(), ProductId::random(), 1)
        .await
        .expect_err("missing product rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[actix_rt::test]
async fn exhausted_product_is_out_of_stock(harness: Harness) {
    let category = category_fixture("Kitap");
    let empty = product_fixture(&category, "Roman", 30.0, 0);
    harness.store.seed_category(category);
    harness.store.seed_product(empty.clone());

    let err = harness
        .service
        .add(harness.identity(), empty.id(), 1)
        .await
        .expect_err("empty stock rejected");
    assert_eq!(err.code(), ErrorCode::OutOfStock);
}

#[rstest]
#[actix_rt::test]
async fn update_replaces_the_quantity(harness: Harness) {
    let view = harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("add succeeds");
    let item = view.lines[0].item.id();

    let updated = harness
        .service
        .update(harness.identity(), item, 1)
        .await
        .expect("update succeeds");
    assert_eq!(updated.lines[0].item.quantity(), 1);
    assert_eq!(updated.item_count, 1);
}

#[rstest]
#[actix_rt::test]
async fn update_rejects_quantities_above_stock(harness: Harness) {
    let view = harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("add succeeds");
    let item = view.lines[0].item.id();

    let err = harness
        .service
        .update(harness.identity(), item, 9)
        .await
        .expect_err("over-stock update rejected");
    assert_eq!(err.code(), ErrorCode::OutOfStock);
}

#[rstest]
#[actix_rt::test]
async fn remove_and_clear_empty_the_cart(harness: Harness) {
    let view = harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("add succeeds");
    let item = view.lines[0].item.id();

    let after_remove = harness
        .service
        .remove(harness.identity(), item)
        .await
        .expect("remove succeeds");
    assert!(after_remove.lines.is_empty());

    harness
        .service
        .add(harness.identity(), harness.product.id(), 1)
        .await
        .expect("re-add succeeds");
    harness
        .service
        .clear(harness.identity())
        .await
        .expect("clear succeeds");
    assert_eq!(harness.store.cart_size(&harness.customer.id()), 0);
}

#[rstest]
#[actix_rt::test]
async fn guests_cannot_touch_the_cart(harness: Harness) {
    let err = harness
        .service
        .view(Identity::guest())
        .await
        .expect_err("guest rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[actix_rt::test]
async fn count_sums_quantities_across_lines(harness: Harness) {
    let category = category_fixture("Kitap");
    let other = product_fixture(&category, "Roman", 30.0, 10);
    harness.store.seed_category(category);
    harness.store.seed_product(other.clone());

    harness
        .service
        .add(harness.identity(), harness.product.id(), 2)
        .await
        .expect("first add succeeds");
    harness
        .service
        .add(harness.identity(), other.id(), 3)
        .await
        .expect("second add succeeds");

    let count = harness
        .service
        .count(harness.identity())
        .await
        .expect("count succeeds");
    assert_eq!(count, 5);
}

//! Unit coverage for the order status machine, quote maths, and
//! order-number formatting.

use chrono::TimeZone;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rstest::rstest;

use super::*;
use crate::domain::cart::CartItem;
use crate::domain::catalog::{Product, ProductDraft};
use crate::domain::{CartItemId, CategoryId};

fn product(price: f64, stock: u32) -> Product {
    let now = Utc::now();
    Product::new(ProductDraft {
        id: ProductId::random(),
        category_id: CategoryId::random(),
        name: "Kulaklık".to_owned(),
        description: None,
        brand: None,
        image_url: None,
        price,
        original_price: None,
        shipping_fee: 14.99,
        commission_fee: 5.0,
        tax_fee: 20.0,
        stock_quantity: stock,
        is_active: true,
        is_featured: false,
        rating: 0.0,
        review_count: 0,
        created_at: now,
        updated_at: now,
    })
    .expect("valid product")
}

fn line(price: f64, quantity: u32) -> CartLine {
    let product = product(price, 99);
    let item = CartItem::new(
        CartItemId::random(),
        UserId::random(),
        product.id(),
        quantity,
        Utc::now(),
    )
    .expect("valid item");
    CartLine { item, product }
}

#[rstest]
#[case(OrderStatus::Pending, OrderStatus::Confirmed, true)]
#[case(OrderStatus::Pending, OrderStatus::Cancelled, true)]
#[case(OrderStatus::Pending, OrderStatus::Shipped, false)]
#[case(OrderStatus::Confirmed, OrderStatus::Shipped, true)]
#[case(OrderStatus::Confirmed, OrderStatus::Cancelled, true)]
#[case(OrderStatus::Confirmed, OrderStatus::Delivered, false)]
#[case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
#[case(OrderStatus::Shipped, OrderStatus::Cancelled, false)]
#[case(OrderStatus::Delivered, OrderStatus::Cancelled, false)]
#[case(OrderStatus::Cancelled, OrderStatus::Pending, false)]
fn status_machine_edges(
    #[case] from: OrderStatus,
    #[case] to: OrderStatus,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn terminal_states() {
    assert!(OrderStatus::Delivered.is_terminal());
    assert!(OrderStatus::Cancelled.is_terminal());
    assert!(!OrderStatus::Shipped.is_terminal());
}

#[rstest]
fn status_round_trips_through_strings() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let parsed: OrderStatus = status.to_string().parse().expect("round trip");
        assert_eq!(parsed, status);
    }
    assert!("teslim".parse::<OrderStatus>().is_err());
}

#[rstest]
#[case(99.99, FLAT_SHIPPING_FEE)]
#[case(100.0, 0.0)]
#[case(250.0, 0.0)]
fn shipping_is_free_from_the_threshold(#[case] subtotal: f64, #[case] fee: f64) {
    assert_eq!(shipping_fee_for(subtotal), fee);
}

#[rstest]
fn quote_sums_lines_and_shipping() {
    // Below the threshold the flat fee applies.
    let quote = quote_cart(&[line(30.0, 2)]);
    assert!((quote.subtotal - 60.0).abs() < 1e-9);
    assert!((quote.shipping_fee - FLAT_SHIPPING_FEE).abs() < 1e-9);
    assert!((quote.grand_total - 75.0).abs() < 1e-9);

    // The worked example: 2×100 + 1×20 = 220, free shipping.
    let quote = quote_cart(&[line(100.0, 2), line(20.0, 1)]);
    assert!((quote.subtotal - 220.0).abs() < 1e-9);
    assert_eq!(quote.shipping_fee, 0.0);
    assert!((quote.grand_total - 220.0).abs() < 1e-9);
}

#[rstest]
fn order_number_has_prefix_date_and_suffix() {
    let mut rng = SmallRng::seed_from_u64(7);
    let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).single().expect("valid date");
    let number = generate_order_number(&mut rng, now);
    assert!(number.starts_with("TR20260830"));
    assert_eq!(number.len(), "TR".len() + 8 + 4);
    assert!(number["TR20260830".len()..].chars().all(|c| c.is_ascii_digit()));
}

#[rstest]
fn order_item_snapshots_totals() {
    let item = OrderItem::new(ProductId::random(), 3, 19.5).expect("valid item");
    assert!((item.total_price() - 58.5).abs() < 1e-9);

    let err = OrderItem::from_stored(ProductId::random(), 3, 19.5, 60.0)
        .expect_err("inconsistent stored total");
    assert_eq!(err, OrderValidationError::InconsistentItemTotal);
}

fn draft_with(items: Vec<OrderItem>, shipping_fee: f64, total: f64) -> OrderDraft {
    let now = Utc::now();
    OrderDraft {
        id: OrderId::random(),
        order_number: "TR202608300001".to_owned(),
        user_id: UserId::random(),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        shipping_fee,
        total_amount: total,
        shipping_address: "Atatürk Cad. No: 5, Ankara".to_owned(),
        billing_address: None,
        payment_method: "kredi karti".to_owned(),
        notes: None,
        items,
        created_at: now,
        updated_at: now,
        shipped_at: None,
        delivered_at: None,
    }
}

#[rstest]
fn order_rejects_total_mismatch() {
    let items = vec![OrderItem::new(ProductId::random(), 2, 50.0).expect("item")];
    let err = Order::new(draft_with(items, 15.0, 100.0)).expect_err("wrong total");
    assert_eq!(err, OrderValidationError::InconsistentTotal);
}

#[rstest]
fn order_rejects_empty_items() {
    let err = Order::new(draft_with(Vec::new(), 0.0, 0.0)).expect_err("no items");
    assert_eq!(err, OrderValidationError::NoItems);
}

#[rstest]
fn status_change_stamps_shipping_timestamps() {
    let items = vec![OrderItem::new(ProductId::random(), 1, 120.0).expect("item")];
    let order = Order::new(draft_with(items, 0.0, 120.0)).expect("valid order");
    assert!(order.can_user_cancel());

    let now = Utc::now();
    let shipped = order.with_status(OrderStatus::Shipped, now);
    assert_eq!(shipped.shipped_at(), Some(now));
    assert!(shipped.delivered_at().is_none());
    assert!(!shipped.can_user_cancel());

    let later = now + chrono::Duration::hours(4);
    let delivered = shipped.with_status(OrderStatus::Delivered, later);
    assert_eq!(delivered.delivered_at(), Some(later));
    assert_eq!(delivered.shipped_at(), Some(now));
}

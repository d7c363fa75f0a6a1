//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema` when
//! the migrations change.

diesel::table! {
    /// Registered accounts, customers and administrators alike.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Nullable<Varchar>,
        password_hash -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        is_admin -> Bool,
        active -> Bool,
        last_login -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Browsing categories; every product belongs to exactly one.
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalog products with pricing components and the rating aggregate.
    products (id) {
        id -> Uuid,
        category_id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        brand -> Nullable<Varchar>,
        image_url -> Nullable<Varchar>,
        price -> Float8,
        original_price -> Nullable<Float8>,
        shipping_fee -> Float8,
        commission_fee -> Float8,
        tax_fee -> Float8,
        stock_quantity -> Int4,
        is_active -> Bool,
        is_featured -> Bool,
        rating -> Float8,
        review_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, product) pair; quantity merges on re-add.
    cart_items (id) {
        id -> Uuid,
        user_id -> Uuid,
        product_id -> Uuid,
        quantity -> Int4,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders; `order_number` carries a unique constraint.
    orders (id) {
        id -> Uuid,
        order_number -> Varchar,
        user_id -> Uuid,
        status -> Varchar,
        payment_status -> Varchar,
        shipping_fee -> Float8,
        total_amount -> Float8,
        shipping_address -> Text,
        billing_address -> Nullable<Text>,
        payment_method -> Varchar,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        shipped_at -> Nullable<Timestamptz>,
        delivered_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Order lines with the unit price captured at purchase time.
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        product_id -> Uuid,
        quantity -> Int4,
        unit_price -> Float8,
        total_price -> Float8,
    }
}

diesel::table! {
    /// Product reviews; one per (user, product), enforced by a unique index.
    reviews (id) {
        id -> Uuid,
        user_id -> Uuid,
        product_id -> Uuid,
        rating -> Int2,
        title -> Nullable<Varchar>,
        comment -> Nullable<Text>,
        is_verified_purchase -> Bool,
        is_approved -> Bool,
        helpful_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(products -> categories (category_id));
diesel::joinable!(cart_items -> users (user_id));
diesel::joinable!(cart_items -> products (product_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));
diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(reviews -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    products,
    cart_items,
    orders,
    order_items,
    reviews,
);

//! In-memory port implementations and fixtures for tests.
//!
//! [`MemoryStore`] implements every driven port over a single mutex-guarded
//! state, including the atomic checkout write, so services can be exercised
//! without a database. Enabled for unit tests and, via the `test-support`
//! feature, for the integration suite.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::cart::{CartItem, CartLine};
use crate::domain::catalog::{Category, CategoryDraft, Product, ProductDraft};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::password::hash_password;
use crate::domain::ports::{
    CartRepository, CatalogRepository, OrderFilter, OrderRepository, PlaceOrderError,
    ProductFilter, ProductSort, ReviewRepository, StoreError, UserRepository,
};
use crate::domain::review::{RatingSummary, Review};
use crate::domain::user::{User, UserDraft};
use crate::domain::{CartItemId, CategoryId, OrderId, ProductId, ReviewId, UserId};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    cart_items: HashMap<CartItemId, CartItem>,
    orders: HashMap<OrderId, Order>,
    reviews: HashMap<ReviewId, Review>,
}

/// Shared in-memory backing store implementing all driven ports.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let slice = items
        .into_iter()
        .skip(start)
        .take(page.per_page() as usize)
        .collect();
    Page::new(slice, page, total)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    /// Seed a user without going through the repository trait.
    pub fn seed_user(&self, user: User) {
        self.lock().users.insert(user.id(), user);
    }

    /// Seed a category without going through the repository trait.
    pub fn seed_category(&self, category: Category) {
        self.lock().categories.insert(category.id(), category);
    }

    /// Seed a product without going through the repository trait.
    pub fn seed_product(&self, product: Product) {
        self.lock().products.insert(product.id(), product);
    }

    /// Current stock of a product, for postcondition assertions.
    pub fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.lock().products.get(id).map(Product::stock_quantity)
    }

    /// Current rating aggregate of a product.
    pub fn rating_of(&self, id: &ProductId) -> Option<(f64, u32)> {
        self.lock()
            .products
            .get(id)
            .map(|p| (p.rating(), p.review_count()))
    }

    /// Number of cart rows a user currently has.
    pub fn cart_size(&self, user: &UserId) -> usize {
        self.lock()
            .cart_items
            .values()
            .filter(|item| item.user_id() == *user)
            .count()
    }

    /// Status of a stored order.
    pub fn order_status(&self, id: &OrderId) -> Option<OrderStatus> {
        self.lock().orders.get(id).map(Order::status)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner
            .users
            .values()
            .any(|existing| existing.username() == user.username())
        {
            return Err(StoreError::conflict("username is already taken"));
        }
        inner.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(user) = inner.users.remove(id) {
            inner.users.insert(*id, user.with_last_login(at));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, StoreError> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(paginate(users, page))
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        self.lock().categories.insert(category.id(), category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        self.lock().categories.insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.lock().categories.get(id).cloned())
    }

    async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> = self
            .lock()
            .categories
            .values()
            .filter(|c| !only_active || c.is_active())
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(categories)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.lock().products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        self.lock().products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(id).cloned())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let needle = filter.query.as_ref().map(|q| q.to_lowercase());
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| !filter.only_active || p.is_active())
            .filter(|p| filter.category.map_or(true, |c| p.category_id() == c))
            .filter(|p| filter.min_price.map_or(true, |min| p.price() >= min))
            .filter(|p| filter.max_price.map_or(true, |max| p.price() <= max))
            .filter(|p| {
                needle.as_ref().map_or(true, |needle| {
                    p.name().to_lowercase().contains(needle)
                        || p.description()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                        || p.brand().is_some_and(|b| b.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect();

        match filter.sort {
            ProductSort::Name => products.sort_by(|a, b| a.name().cmp(b.name())),
            ProductSort::PriceAsc => {
                products.sort_by(|a, b| a.price().total_cmp(&b.price()));
            }
            ProductSort::PriceDesc => {
                products.sort_by(|a, b| b.price().total_cmp(&a.price()));
            }
            ProductSort::Rating => {
                products.sort_by(|a, b| b.rating().total_cmp(&a.rating()));
            }
            ProductSort::Newest => {
                products.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            }
        }
        Ok(paginate(products, page))
    }

    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| p.is_active() && p.is_featured())
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn similar_products(
        &self,
        category: &CategoryId,
        exclude: &ProductId,
        limit: u32,
    ) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| p.is_active() && p.category_id() == *category && p.id() != *exclude)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name().cmp(b.name()));
        products.truncate(limit as usize);
        Ok(products)
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list_lines(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError> {
        let inner = self.lock();
        let mut lines: Vec<CartLine> = inner
            .cart_items
            .values()
            .filter(|item| item.user_id() == *user)
            .filter_map(|item| {
                inner.products.get(&item.product_id()).map(|product| CartLine {
                    item: item.clone(),
                    product: product.clone(),
                })
            })
            .collect();
        lines.sort_by(|a, b| a.item.added_at().cmp(&b.item.added_at()));
        Ok(lines)
    }

    async fn find_line_for_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<CartLine>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .cart_items
            .values()
            .find(|item| item.user_id() == *user && item.product_id() == *product)
            .and_then(|item| {
                inner.products.get(&item.product_id()).map(|product| CartLine {
                    item: item.clone(),
                    product: product.clone(),
                })
            }))
    }

    async fn find_line(
        &self,
        user: &UserId,
        item: &CartItemId,
    ) -> Result<Option<CartLine>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .cart_items
            .get(item)
            .filter(|row| row.user_id() == *user)
            .and_then(|row| {
                inner.products.get(&row.product_id()).map(|product| CartLine {
                    item: row.clone(),
                    product: product.clone(),
                })
            }))
    }

    async fn upsert_item(&self, item: &CartItem) -> Result<(), StoreError> {
        self.lock().cart_items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn remove_item(&self, user: &UserId, item: &CartItemId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner
            .cart_items
            .get(item)
            .is_some_and(|row| row.user_id() == *user)
        {
            inner.cart_items.remove(item);
        }
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> Result<(), StoreError> {
        self.lock()
            .cart_items
            .retain(|_, item| item.user_id() != *user);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(&self, order: &Order) -> Result<(), PlaceOrderError> {
        let mut inner = self.lock();

        if inner
            .orders
            .values()
            .any(|existing| existing.order_number() == order.order_number())
        {
            return Err(PlaceOrderError::DuplicateOrderNumber);
        }

        // Validate every decrement before applying any, mirroring the
        // all-or-nothing transaction of the SQL adapter.
        for item in order.items() {
            let Some(product) = inner.products.get(&item.product_id()) else {
                return Err(PlaceOrderError::Store(StoreError::query(format!(
                    "product {} missing",
                    item.product_id()
                ))));
            };
            if product.stock_quantity() < item.quantity() {
                return Err(PlaceOrderError::InsufficientStock {
                    product_id: item.product_id(),
                });
            }
        }

        for item in order.items() {
            if let Some(product) = inner.products.remove(&item.product_id()) {
                let remaining = product.stock_quantity() - item.quantity();
                inner
                    .products
                    .insert(item.product_id(), product.with_stock_quantity(remaining));
            }
        }

        let user = order.user_id();
        inner.cart_items.retain(|_, item| item.user_id() != user);
        inner.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_for_user(
        &self,
        user: &UserId,
        id: &OrderId,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .lock()
            .orders
            .get(id)
            .filter(|order| order.user_id() == *user)
            .cloned())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|order| order.user_id() == *user)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(paginate(orders, page))
    }

    async fn list_all(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|order| filter.status.map_or(true, |s| order.status() == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(paginate(orders, page))
    }

    async fn update_status(&self, order: &Order) -> Result<(), StoreError> {
        self.lock().orders.insert(order.id(), order.clone());
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.lock().reviews.get(id).cloned())
    }

    async fn find_by_user_and_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<Review>, StoreError> {
        Ok(self
            .lock()
            .reviews
            .values()
            .find(|review| review.user_id() == *user && review.product_id() == *product)
            .cloned())
    }

    async fn list_approved_for_product(
        &self,
        product: &ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, StoreError> {
        let mut reviews: Vec<Review> = self
            .lock()
            .reviews
            .values()
            .filter(|review| review.product_id() == *product && review.is_approved())
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        reviews.truncate(limit as usize);
        Ok(reviews)
    }

    async fn approved_ratings(&self, product: &ProductId) -> Result<Vec<u8>, StoreError> {
        Ok(self
            .lock()
            .reviews
            .values()
            .filter(|review| review.product_id() == *product && review.is_approved())
            .map(Review::rating)
            .collect())
    }

    async fn append(&self, review: &Review, summary: RatingSummary) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.reviews.values().any(|existing| {
            existing.user_id() == review.user_id() && existing.product_id() == review.product_id()
        }) {
            return Err(StoreError::conflict("review already exists"));
        }
        inner.reviews.insert(review.id(), review.clone());
        if let Some(product) = inner.products.remove(&review.product_id()) {
            inner.products.insert(
                review.product_id(),
                product.with_rating(summary.average, summary.count),
            );
        }
        Ok(())
    }

    async fn set_approval(
        &self,
        id: &ReviewId,
        approved: bool,
        summary: RatingSummary,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let Some(review) = inner.reviews.remove(id) else {
            return Err(StoreError::query(format!("review {id} missing")));
        };
        let product_id = review.product_id();
        inner
            .reviews
            .insert(*id, review.with_approval(approved, Utc::now()));
        if let Some(product) = inner.products.remove(&product_id) {
            inner.products.insert(
                product_id,
                product.with_rating(summary.average, summary.count),
            );
        }
        Ok(())
    }

    async fn list_all(&self, page: PageRequest) -> Result<Page<Review>, StoreError> {
        let mut reviews: Vec<Review> = self.lock().reviews.values().cloned().collect();
        reviews.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(paginate(reviews, page))
    }
}

/// Build a named active category.
pub fn category_fixture(name: &str) -> Category {
    Category::new(CategoryDraft {
        id: CategoryId::random(),
        name: name.to_owned(),
        description: None,
        is_active: true,
        created_at: Utc::now(),
    })
    .expect("valid category fixture")
}

/// Build an active product in the given category with default fees.
pub fn product_fixture(category: &Category, name: &str, price: f64, stock: u32) -> Product {
    let now = Utc::now();
    Product::new(ProductDraft {
        id: ProductId::random(),
        category_id: category.id(),
        name: name.to_owned(),
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
    .expect("valid product fixture")
}

/// Build an active user with a freshly hashed password.
pub fn user_fixture(username: &str, password: &str, is_admin: bool) -> User {
    let now = Utc::now();
    User::new(UserDraft {
        id: UserId::random(),
        username: username.to_owned(),
        email: None,
        password_hash: hash_password(password).expect("valid fixture password"),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        is_admin,
        active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid user fixture")
}

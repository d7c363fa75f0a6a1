//! PostgreSQL-backed `CatalogRepository` implementation using Diesel ORM.
//!
//! Listing queries are built dynamically with `into_boxed` so one code path
//! serves filtering, search, and every sort order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::catalog::{Category, CategoryDraft, Product, ProductDraft};
use crate::domain::ports::{CatalogRepository, ProductFilter, ProductSort, StoreError};
use crate::domain::{CategoryId, ProductId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CategoryChangeset, CategoryRow, NewCategoryRow, NewProductRow, ProductChangeset, ProductRow,
};
use super::pool::DbPool;
use super::schema::{categories, products};

/// Diesel-backed implementation of the `CatalogRepository` port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: CategoryRow) -> Result<Category, StoreError> {
    Category::new(CategoryDraft {
        id: CategoryId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        is_active: row.is_active,
        created_at: row.created_at,
    })
    .map_err(|err| StoreError::query(format!("corrupt category row: {err}")))
}

pub(crate) fn row_to_product(row: ProductRow) -> Result<Product, StoreError> {
    Product::new(ProductDraft {
        id: ProductId::from_uuid(row.id),
        category_id: CategoryId::from_uuid(row.category_id),
        name: row.name,
        description: row.description,
        brand: row.brand,
        image_url: row.image_url,
        price: row.price,
        original_price: row.original_price,
        shipping_fee: row.shipping_fee,
        commission_fee: row.commission_fee,
        tax_fee: row.tax_fee,
        stock_quantity: u32::try_from(row.stock_quantity).unwrap_or_default(),
        is_active: row.is_active,
        is_featured: row.is_featured,
        rating: row.rating,
        review_count: u32::try_from(row.review_count).unwrap_or_default(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| StoreError::query(format!("corrupt product row: {err}")))
}

fn new_product_row(product: &Product) -> NewProductRow<'_> {
    NewProductRow {
        id: product.id().into(),
        category_id: product.category_id().into(),
        name: product.name(),
        description: product.description(),
        brand: product.brand(),
        image_url: product.image_url(),
        price: product.price(),
        original_price: product.original_price(),
        shipping_fee: product.shipping_fee(),
        commission_fee: product.commission_fee(),
        tax_fee: product.tax_fee(),
        stock_quantity: i32::try_from(product.stock_quantity()).unwrap_or(i32::MAX),
        is_active: product.is_active(),
        is_featured: product.is_featured(),
        rating: product.rating(),
        review_count: i32::try_from(product.review_count()).unwrap_or(i32::MAX),
        created_at: product.created_at(),
        updated_at: product.updated_at(),
    }
}

type BoxedProductQuery<'a> = products::BoxedQuery<'a, diesel::pg::Pg>;

/// Apply filter predicates shared by the count and page queries.
fn filtered_products(filter: &ProductFilter) -> BoxedProductQuery<'_> {
    let mut query = products::table.into_boxed();

    if filter.only_active {
        query = query.filter(products::is_active.eq(true));
    }
    if let Some(category) = filter.category {
        query = query.filter(products::category_id.eq(Uuid::from(category)));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(products::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(products::price.le(max));
    }
    if let Some(needle) = &filter.query {
        let pattern = format!("%{needle}%");
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern.clone()))
                .or(products::brand.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewCategoryRow {
            id: category.id().into(),
            name: category.name(),
            description: category.description(),
            is_active: category.is_active(),
            created_at: category.created_at(),
        };

        diesel::insert_into(categories::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = CategoryChangeset {
            name: category.name(),
            description: category.description(),
            is_active: category.is_active(),
        };

        diesel::update(categories::table.find(*category.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CategoryRow> = categories::table
            .find(*id.as_uuid())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_category).transpose()
    }

    async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = categories::table.into_boxed();
        if only_active {
            query = query.filter(categories::is_active.eq(true));
        }

        let rows: Vec<CategoryRow> = query
            .order(categories::name.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_category).collect()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(products::table)
            .values(&new_product_row(product))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = ProductChangeset {
            category_id: product.category_id().into(),
            name: product.name(),
            description: product.description(),
            brand: product.brand(),
            image_url: product.image_url(),
            price: product.price(),
            original_price: product.original_price(),
            shipping_fee: product.shipping_fee(),
            commission_fee: product.commission_fee(),
            tax_fee: product.tax_fee(),
            stock_quantity: i32::try_from(product.stock_quantity()).unwrap_or(i32::MAX),
            is_active: product.is_active(),
            is_featured: product.is_featured(),
            updated_at: product.updated_at(),
        };

        diesel::update(products::table.find(*product.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProductRow> = products::table
            .find(*id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered_products(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut query = filtered_products(filter);
        query = match filter.sort {
            ProductSort::Name => query.order(products::name.asc()),
            ProductSort::PriceAsc => query.order(products::price.asc()),
            ProductSort::PriceDesc => query.order(products::price.desc()),
            ProductSort::Rating => query.order(products::rating.desc()),
            ProductSort::Newest => query.order(products::created_at.desc()),
        };

        let rows: Vec<ProductRow> = query
            .limit(page.limit())
            .offset(page.offset())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_product)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total.unsigned_abs()))
    }

    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProductRow> = products::table
            .filter(products::is_active.eq(true))
            .filter(products::is_featured.eq(true))
            .order(products::created_at.desc())
            .limit(i64::from(limit))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_product).collect()
    }

    async fn similar_products(
        &self,
        category: &CategoryId,
        exclude: &ProductId,
        limit: u32,
    ) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProductRow> = products::table
            .filter(products::is_active.eq(true))
            .filter(products::category_id.eq(*category.as_uuid()))
            .filter(products::id.ne(*exclude.as_uuid()))
            .order(products::name.asc())
            .limit(i64::from(limit))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_product).collect()
    }
}

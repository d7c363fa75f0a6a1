//! Catalog use-case services: customer-facing reads and admin maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::catalog::{Category, CategoryDraft, Product, ProductDraft};
use crate::domain::ports::{
    CartRepository, CatalogAdmin, CatalogQuery, CatalogRepository, CategoryInput, ProductDetail,
    ProductFilter, ProductInput, ReviewRepository, Storefront,
};
use crate::domain::{CategoryId, Error, Identity, ProductId};
use pagination::{Page, PageRequest};

/// Featured products shown on the storefront.
const STOREFRONT_FEATURED: u32 = 8;
/// Approved reviews bundled into a product detail.
const DETAIL_REVIEWS: u32 = 10;
/// Same-category products suggested under a detail page.
const DETAIL_SIMILAR: u32 = 4;

/// Catalog reads and admin writes over the catalog, cart, and review
/// repositories.
#[derive(Clone)]
pub struct CatalogService<C, K, R> {
    catalog: Arc<C>,
    carts: Arc<K>,
    reviews: Arc<R>,
}

impl<C, K, R> CatalogService<C, K, R> {
    /// Create a new service with its repositories.
    pub fn new(catalog: Arc<C>, carts: Arc<K>, reviews: Arc<R>) -> Self {
        Self {
            catalog,
            carts,
            reviews,
        }
    }
}

#[async_trait]
impl<C, K, R> CatalogQuery for CatalogService<C, K, R>
where
    C: CatalogRepository,
    K: CartRepository,
    R: ReviewRepository,
{
    async fn storefront(&self) -> Result<Storefront, Error> {
        let featured = self.catalog.featured_products(STOREFRONT_FEATURED).await?;
        let categories = self.catalog.list_categories(true).await?;
        Ok(Storefront {
            featured,
            categories,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(self.catalog.list_categories(true).await?)
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        Ok(self.catalog.list_products(&filter, page).await?)
    }

    async fn product_detail(
        &self,
        id: ProductId,
        identity: Identity,
    ) -> Result<ProductDetail, Error> {
        let product = self
            .catalog
            .find_product(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;

        let reviews = self
            .reviews
            .list_approved_for_product(&id, DETAIL_REVIEWS)
            .await?;
        let similar = self
            .catalog
            .similar_products(&product.category_id(), &id, DETAIL_SIMILAR)
            .await?;

        let cart_quantity = match identity.user_id() {
            Some(user) => self
                .carts
                .find_line_for_product(&user, &id)
                .await?
                .map(|line| line.item.quantity()),
            None => None,
        };

        Ok(ProductDetail {
            product,
            reviews,
            similar,
            cart_quantity,
        })
    }
}

#[async_trait]
impl<C, K, R> CatalogAdmin for CatalogService<C, K, R>
where
    C: CatalogRepository,
    K: CartRepository,
    R: ReviewRepository,
{
    async fn create_category(
        &self,
        identity: Identity,
        input: CategoryInput,
    ) -> Result<Category, Error> {
        let admin = identity.require_admin()?;
        let category = Category::new(CategoryDraft {
            id: CategoryId::random(),
            name: input.name,
            description: input.description,
            is_active: input.is_active,
            created_at: Utc::now(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog.insert_category(&category).await?;
        tracing::info!(admin = %admin, category = %category.id(), "category created");
        Ok(category)
    }

    async fn update_category(
        &self,
        identity: Identity,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<Category, Error> {
        identity.require_admin()?;
        let existing = self
            .catalog
            .find_category(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("category {id} not found")))?;

        let category = Category::new(CategoryDraft {
            id,
            name: input.name,
            description: input.description,
            is_active: input.is_active,
            created_at: existing.created_at(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog.update_category(&category).await?;
        Ok(category)
    }

    async fn create_product(
        &self,
        identity: Identity,
        input: ProductInput,
    ) -> Result<Product, Error> {
        let admin = identity.require_admin()?;
        self.require_category(&input.category_id).await?;

        let now = Utc::now();
        let product = Product::new(ProductDraft {
            id: ProductId::random(),
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            brand: input.brand,
            image_url: input.image_url,
            price: input.price,
            original_price: input.original_price,
            shipping_fee: input.shipping_fee,
            commission_fee: input.commission_fee,
            tax_fee: input.tax_fee,
            stock_quantity: input.stock_quantity,
            is_active: input.is_active,
            is_featured: input.is_featured,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog.insert_product(&product).await?;
        tracing::info!(admin = %admin, product = %product.id(), "product created");
        Ok(product)
    }

    async fn update_product(
        &self,
        identity: Identity,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, Error> {
        let admin = identity.require_admin()?;
        let existing = self
            .catalog
            .find_product(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;
        self.require_category(&input.category_id).await?;

        // The rating aggregate belongs to the review flow; edits keep it.
        let product = Product::new(ProductDraft {
            id,
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            brand: input.brand,
            image_url: input.image_url,
            price: input.price,
            original_price: input.original_price,
            shipping_fee: input.shipping_fee,
            commission_fee: input.commission_fee,
            tax_fee: input.tax_fee,
            stock_quantity: input.stock_quantity,
            is_active: input.is_active,
            is_featured: input.is_featured,
            rating: existing.rating(),
            review_count: existing.review_count(),
            created_at: existing.created_at(),
            updated_at: Utc::now(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog.update_product(&product).await?;
        tracing::info!(admin = %admin, product = %id, "product updated");
        Ok(product)
    }
}

impl<C, K, R> CatalogService<C, K, R>
where
    C: CatalogRepository,
    K: CartRepository,
    R: ReviewRepository,
{
    async fn require_category(&self, id: &CategoryId) -> Result<(), Error> {
        self.catalog
            .find_category(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::invalid_request(format!("category {id} does not exist")))
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;

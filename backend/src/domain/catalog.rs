//! Catalog aggregates: categories and products.
//!
//! Products carry the stored fee fields that feed the customer-facing
//! price maths: the commission is charged on the base price, tax on the
//! commission-inclusive price, and the flat shipping fee is added last.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CategoryId, ProductId};

/// Highest rating a product can hold.
pub const MAX_RATING: f64 = 5.0;

/// Validation failures raised by the catalog constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogValidationError {
    #[error("category name must not be empty")]
    EmptyCategoryName,
    #[error("product name must not be empty")]
    EmptyProductName,
    #[error("product price must be greater than zero")]
    NonPositivePrice,
    #[error("original price must be greater than zero when present")]
    NonPositiveOriginalPrice,
    #[error("fee percentages and shipping fee must not be negative")]
    NegativeFee,
    #[error("product rating must lie within [0, {MAX_RATING}]")]
    RatingOutOfRange,
}

/// A browsing category. Products reference exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// Unvalidated category fields, typically decoded from storage or input.
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Validate a draft into a category.
    pub fn new(draft: CategoryDraft) -> Result<Self, CatalogValidationError> {
        if draft.name.trim().is_empty() {
            return Err(CatalogValidationError::EmptyCategoryName);
        }
        Ok(Self {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            is_active: draft.is_active,
            created_at: draft.created_at,
        })
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A sellable product.
///
/// ## Invariants
/// - `price > 0`; `original_price`, when present, is also positive.
/// - `stock_quantity` never goes negative (enforced by the type).
/// - `rating ∈ [0, 5]`; `review_count` matches the approved review count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: String,
    description: Option<String>,
    brand: Option<String>,
    image_url: Option<String>,
    price: f64,
    original_price: Option<f64>,
    shipping_fee: f64,
    commission_fee: f64,
    tax_fee: f64,
    stock_quantity: u32,
    is_active: bool,
    is_featured: bool,
    rating: f64,
    review_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Unvalidated product fields.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub shipping_fee: f64,
    pub commission_fee: f64,
    pub tax_fee: f64,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: f64,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate a draft into a product.
    pub fn new(draft: ProductDraft) -> Result<Self, CatalogValidationError> {
        if draft.name.trim().is_empty() {
            return Err(CatalogValidationError::EmptyProductName);
        }
        if draft.price <= 0.0 {
            return Err(CatalogValidationError::NonPositivePrice);
        }
        if draft.original_price.is_some_and(|p| p <= 0.0) {
            return Err(CatalogValidationError::NonPositiveOriginalPrice);
        }
        if draft.shipping_fee < 0.0 || draft.commission_fee < 0.0 || draft.tax_fee < 0.0 {
            return Err(CatalogValidationError::NegativeFee);
        }
        if !(0.0..=MAX_RATING).contains(&draft.rating) {
            return Err(CatalogValidationError::RatingOutOfRange);
        }
        Ok(Self {
            id: draft.id,
            category_id: draft.category_id,
            name: draft.name,
            description: draft.description,
            brand: draft.brand,
            image_url: draft.image_url,
            price: draft.price,
            original_price: draft.original_price,
            shipping_fee: draft.shipping_fee,
            commission_fee: draft.commission_fee,
            tax_fee: draft.tax_fee,
            stock_quantity: draft.stock_quantity,
            is_active: draft.is_active,
            is_featured: draft.is_featured,
            rating: draft.rating,
            review_count: draft.review_count,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Seller-set base price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Pre-discount price, when the product is on sale.
    pub fn original_price(&self) -> Option<f64> {
        self.original_price
    }

    pub fn shipping_fee(&self) -> f64 {
        self.shipping_fee
    }

    /// Commission percentage charged on the base price.
    pub fn commission_fee(&self) -> f64 {
        self.commission_fee
    }

    /// Tax percentage charged on the commission-inclusive price.
    pub fn tax_fee(&self) -> f64 {
        self.tax_fee
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    /// Mean rating across approved reviews.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Number of approved reviews.
    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Snapshot with an adjusted stock level.
    pub fn with_stock_quantity(mut self, stock_quantity: u32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Snapshot with a recomputed rating aggregate.
    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    /// Whether at least one unit is available.
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Customer-facing price: base price plus tax and shipping.
    ///
    /// `commission = price × commission_fee%` and
    /// `tax = (price + commission) × tax_fee%`. The commission itself is the
    /// marketplace's cut and is not added on top.
    pub fn final_price(&self) -> f64 {
        let commission_amount = self.price * (self.commission_fee / 100.0);
        let tax_amount = (self.price + commission_amount) * (self.tax_fee / 100.0);
        self.price + tax_amount + self.shipping_fee
    }

    /// Whole-number discount percentage against the original price.
    pub fn discount_percentage(&self) -> u32 {
        match self.original_price {
            Some(original) if original > self.price => {
                ((original - self.price) / original * 100.0) as u32
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn draft() -> ProductDraft {
        let now = Utc::now();
        ProductDraft {
            id: ProductId::random(),
            category_id: CategoryId::random(),
            name: "Mekanik Klavye".to_owned(),
            description: None,
            brand: Some("Hyper".to_owned()),
            image_url: None,
            price: 100.0,
            original_price: None,
            shipping_fee: 14.99,
            commission_fee: 5.0,
            tax_fee: 20.0,
            stock_quantity: 5,
            is_active: true,
            is_featured: false,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn rejects_non_positive_price(mut draft: ProductDraft) {
        draft.price = 0.0;
        let err = Product::new(draft).expect_err("zero price");
        assert_eq!(err, CatalogValidationError::NonPositivePrice);
    }

    #[rstest]
    fn rejects_out_of_range_rating(mut draft: ProductDraft) {
        draft.rating = 5.1;
        let err = Product::new(draft).expect_err("rating above cap");
        assert_eq!(err, CatalogValidationError::RatingOutOfRange);
    }

    #[rstest]
    fn final_price_adds_tax_and_shipping(draft: ProductDraft) {
        let product = Product::new(draft).expect("valid product");
        // commission 5 → tax base 105 → tax 21 → 100 + 21 + 14.99
        let expected = 135.99;
        assert!((product.final_price() - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(Some(200.0), 50)]
    #[case(Some(125.0), 20)]
    #[case(Some(90.0), 0)]
    #[case(None, 0)]
    fn discount_percentage_is_whole_number(
        mut draft: ProductDraft,
        #[case] original: Option<f64>,
        #[case] expected: u32,
    ) {
        draft.original_price = original;
        let product = Product::new(draft).expect("valid product");
        assert_eq!(product.discount_percentage(), expected);
    }

    #[rstest]
    fn stock_flag_follows_quantity(mut draft: ProductDraft) {
        draft.stock_quantity = 0;
        let product = Product::new(draft).expect("valid product");
        assert!(!product.is_in_stock());
    }

    #[rstest]
    fn category_requires_a_name() {
        let err = Category::new(CategoryDraft {
            id: CategoryId::random(),
            name: "   ".to_owned(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        })
        .expect_err("blank name");
        assert_eq!(err, CatalogValidationError::EmptyCategoryName);
    }
}

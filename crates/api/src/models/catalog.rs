//! Catalog domain types: categories, products, sliders.

use rust_decimal::Decimal;

use bazaar_core::{CategoryId, ProductId, SliderId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Category title.
    pub title: String,
    /// Category description.
    pub description: Option<String>,
    /// Relative path of the category image.
    pub image_path: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (unique).
    pub name: String,
    /// Product description.
    pub description: Option<String>,
    /// Current unit price. Orders snapshot this at placement time.
    pub price: Decimal,
    /// Relative path of the product image.
    pub image_path: Option<String>,
    /// Average rating.
    pub rating: Option<Decimal>,
    /// 1 when the product is flagged as a best seller, 0 otherwise.
    pub best_seller: i32,
    /// Owning category.
    pub category_id: CategoryId,
}

/// A home screen slider entry.
#[derive(Debug, Clone)]
pub struct Slider {
    /// Unique slider ID.
    pub id: SliderId,
    /// Slider title.
    pub title: String,
    /// Slider description.
    pub description: Option<String>,
    /// Relative path of the slider image.
    pub image_path: Option<String>,
}

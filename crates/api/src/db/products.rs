//! Product repository.

use rust_decimal::Decimal;
use sqlx::PgExecutor;

use bazaar_core::{CategoryId, ProductId};

use super::{RepositoryError, map_foreign_key_violation, map_unique_violation};
use crate::models::{Category, Product};

/// Refusal message when deleting a product would erase order history.
pub const ORDERED_DELETE_CONFLICT: &str = "Product has existing orders and cannot be deleted";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_path: Option<String>,
    rating: Option<Decimal>,
    best_seller: i32,
    category_id: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_path: row.image_path,
            rating: row.rating,
            best_seller: row.best_seller,
            category_id: CategoryId::new(row.category_id),
        }
    }
}

/// Internal row type for product + category joined queries.
///
/// The category side is nullable so a dangling reference degrades to a
/// null category in the payload instead of failing the whole listing.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_path: Option<String>,
    rating: Option<Decimal>,
    best_seller: i32,
    category_id: i32,
    cat_id: Option<i32>,
    cat_title: Option<String>,
    cat_description: Option<String>,
    cat_image_path: Option<String>,
}

impl From<ProductWithCategoryRow> for (Product, Option<Category>) {
    fn from(row: ProductWithCategoryRow) -> Self {
        let category = match (row.cat_id, row.cat_title) {
            (Some(id), Some(title)) => Some(Category {
                id: CategoryId::new(id),
                title,
                description: row.cat_description,
                image_path: row.cat_image_path,
            }),
            _ => None,
        };

        let product = Product {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_path: row.image_path,
            rating: row.rating,
            best_seller: row.best_seller,
            category_id: CategoryId::new(row.category_id),
        };

        (product, category)
    }
}

const JOINED_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.image_path, \
     p.rating, p.best_seller, p.category_id, \
     c.id AS cat_id, c.title AS cat_title, c.description AS cat_description, \
     c.image_path AS cat_image_path \
     FROM products p LEFT JOIN categories c ON c.id = p.category_id";

/// List all products with their category summaries.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_with_category(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<(Product, Option<Category>)>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
        "{JOINED_SELECT} ORDER BY p.id"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// The two highest-rated products (rating descending, insertion order as
/// the stable tie-break).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn top_rated(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<(Product, Option<Category>)>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
        "{JOINED_SELECT} ORDER BY p.rating DESC NULLS LAST, p.id LIMIT 2"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Products flagged as best sellers.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn best_sellers(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<(Product, Option<Category>)>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
        "{JOINED_SELECT} WHERE p.best_seller = 1 ORDER BY p.id"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Case-insensitive substring search on product name.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn search_by_name(
    executor: impl PgExecutor<'_>,
    query: &str,
) -> Result<Vec<(Product, Option<Category>)>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
        "{JOINED_SELECT} WHERE p.name ILIKE $1 ORDER BY p.id"
    ))
    .bind(format!("%{query}%"))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Products owned by the given categories, for the category listing.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, price, image_path, rating, best_seller, category_id \
         FROM products ORDER BY id",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Image paths of every product in a category, for stored-file cleanup
/// when the category delete cascades over its products.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn image_paths_for_category(
    executor: impl PgExecutor<'_>,
    category_id: CategoryId,
) -> Result<Vec<String>, RepositoryError> {
    let paths = sqlx::query_scalar::<_, String>(
        "SELECT image_path FROM products WHERE category_id = $1 AND image_path IS NOT NULL",
    )
    .bind(category_id.as_i32())
    .fetch_all(executor)
    .await?;

    Ok(paths)
}

/// Get a product by its ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, price, image_path, rating, best_seller, category_id \
         FROM products WHERE id = $1",
    )
    .bind(id.as_i32())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Into::into))
}

/// Parameters for creating a product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub rating: Decimal,
    pub best_seller: i32,
    pub category_id: CategoryId,
    pub image_path: &'a str,
}

/// Create a new product.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the name already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create(
    executor: impl PgExecutor<'_>,
    params: NewProduct<'_>,
) -> Result<Product, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (name, description, price, rating, best_seller, category_id, image_path) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, name, description, price, image_path, rating, best_seller, category_id",
    )
    .bind(params.name)
    .bind(params.description)
    .bind(params.price)
    .bind(params.rating)
    .bind(params.best_seller)
    .bind(params.category_id.as_i32())
    .bind(params.image_path)
    .fetch_one(executor)
    .await
    .map_err(|e| map_unique_violation(e, |_| "Product name already exists".to_owned()))?;

    Ok(row.into())
}

/// Save a product's fields. Callers resolve partial updates by loading
/// the product first and passing the final values here.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Conflict` if the name is taken by another product.
pub async fn update(
    executor: impl PgExecutor<'_>,
    product: &Product,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE products SET name = $1, description = $2, price = $3, rating = $4, \
         best_seller = $5, category_id = $6, image_path = $7 WHERE id = $8",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.rating)
    .bind(product.best_seller)
    .bind(product.category_id.as_i32())
    .bind(&product.image_path)
    .bind(product.id.as_i32())
    .execute(executor)
    .await
    .map_err(|e| map_unique_violation(e, |_| "Product name already exists".to_owned()))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a product by its ID.
///
/// Order items keep a `RESTRICT` reference to products, so a product that
/// has been ordered cannot be deleted.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Conflict` if order items reference it.
pub async fn delete(
    executor: impl PgExecutor<'_>,
    id: ProductId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id.as_i32())
        .execute(executor)
        .await
        .map_err(|e| map_foreign_key_violation(e, || ORDERED_DELETE_CONFLICT.to_owned()))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

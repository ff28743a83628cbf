//! Favorites repository (user <-> product many-to-many).
//!
//! Membership has set semantics: adding twice is a no-op, as is removing
//! a product that was never favorited.

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgExecutor;

use bazaar_core::{CategoryId, ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

/// Product IDs in the user's favorites set.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn ids_for_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<HashSet<ProductId>, RepositoryError> {
    let ids = sqlx::query_scalar::<_, i32>(
        "SELECT product_id FROM favorites WHERE user_id = $1",
    )
    .bind(user_id.as_i32())
    .fetch_all(executor)
    .await?;

    Ok(ids.into_iter().map(ProductId::new).collect())
}

#[derive(Debug, sqlx::FromRow)]
struct FavoriteProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_path: Option<String>,
    rating: Option<Decimal>,
    best_seller: i32,
    category_id: i32,
}

/// Fully expanded favorite products for a user, for profile payloads.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn products_for_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, FavoriteProductRow>(
        "SELECT p.id, p.name, p.description, p.price, p.image_path, p.rating, \
         p.best_seller, p.category_id \
         FROM favorites f JOIN products p ON p.id = f.product_id \
         WHERE f.user_id = $1 ORDER BY p.id",
    )
    .bind(user_id.as_i32())
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Product {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_path: row.image_path,
            rating: row.rating,
            best_seller: row.best_seller,
            category_id: CategoryId::new(row.category_id),
        })
        .collect())
}

/// Add a product to the user's favorites (no-op if already present).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn add(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO favorites (user_id, product_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id.as_i32())
    .bind(product_id.as_i32())
    .execute(executor)
    .await?;

    Ok(())
}

/// Remove a product from the user's favorites (no-op if absent).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn remove(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(executor)
        .await?;

    Ok(())
}

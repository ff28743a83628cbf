//! Category repository.

use sqlx::PgExecutor;

use bazaar_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Refusal message when a category delete would cascade over ordered products.
pub const ORDERED_DELETE_CONFLICT: &str =
    "Category has products with existing orders and cannot be deleted";

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    title: String,
    description: Option<String>,
    image_path: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            title: row.title,
            description: row.description,
            image_path: row.image_path,
        }
    }
}

/// List all categories, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Category>, RepositoryError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, title, description, image_path FROM categories ORDER BY id",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Get a category by its ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    id: CategoryId,
) -> Result<Option<Category>, RepositoryError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, title, description, image_path FROM categories WHERE id = $1",
    )
    .bind(id.as_i32())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Into::into))
}

/// Create a new category.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(
    executor: impl PgExecutor<'_>,
    title: &str,
    description: &str,
    image_path: &str,
) -> Result<Category, RepositoryError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (title, description, image_path) \
         VALUES ($1, $2, $3) \
         RETURNING id, title, description, image_path",
    )
    .bind(title)
    .bind(description)
    .bind(image_path)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Save a category's fields. Callers resolve partial updates by loading
/// the category first and passing the final values here.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the category doesn't exist.
pub async fn update(
    executor: impl PgExecutor<'_>,
    category: &Category,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE categories SET title = $1, description = $2, image_path = $3 WHERE id = $4",
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.image_path)
    .bind(category.id.as_i32())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a category by its ID. Its products go with it by cascade.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the category doesn't exist.
/// Returns `RepositoryError::Conflict` if the cascade would delete a
/// product that order items still reference.
pub async fn delete(
    executor: impl PgExecutor<'_>,
    id: CategoryId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id.as_i32())
        .execute(executor)
        .await
        .map_err(|e| {
            super::map_foreign_key_violation(e, || ORDERED_DELETE_CONFLICT.to_owned())
        })?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

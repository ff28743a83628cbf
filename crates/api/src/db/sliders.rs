//! Slider repository.

use sqlx::PgExecutor;

use bazaar_core::SliderId;

use super::RepositoryError;
use crate::models::Slider;

/// Internal row type for slider queries.
#[derive(Debug, sqlx::FromRow)]
struct SliderRow {
    id: i32,
    title: String,
    description: Option<String>,
    image_path: Option<String>,
}

impl From<SliderRow> for Slider {
    fn from(row: SliderRow) -> Self {
        Self {
            id: SliderId::new(row.id),
            title: row.title,
            description: row.description,
            image_path: row.image_path,
        }
    }
}

/// List all sliders, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Slider>, RepositoryError> {
    let rows = sqlx::query_as::<_, SliderRow>(
        "SELECT id, title, description, image_path FROM sliders ORDER BY id",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Get a slider by its ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    id: SliderId,
) -> Result<Option<Slider>, RepositoryError> {
    let row = sqlx::query_as::<_, SliderRow>(
        "SELECT id, title, description, image_path FROM sliders WHERE id = $1",
    )
    .bind(id.as_i32())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Into::into))
}

/// Create a new slider.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(
    executor: impl PgExecutor<'_>,
    title: &str,
    description: &str,
    image_path: &str,
) -> Result<Slider, RepositoryError> {
    let row = sqlx::query_as::<_, SliderRow>(
        "INSERT INTO sliders (title, description, image_path) \
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

/// Save a slider's fields. Callers resolve partial updates by loading
/// the slider first and passing the final values here.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the slider doesn't exist.
pub async fn update(
    executor: impl PgExecutor<'_>,
    slider: &Slider,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE sliders SET title = $1, description = $2, image_path = $3 WHERE id = $4",
    )
    .bind(&slider.title)
    .bind(&slider.description)
    .bind(&slider.image_path)
    .bind(slider.id.as_i32())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a slider by its ID.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the slider doesn't exist.
pub async fn delete(executor: impl PgExecutor<'_>, id: SliderId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM sliders WHERE id = $1")
        .bind(id.as_i32())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

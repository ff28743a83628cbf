//! Favorites endpoints.
//!
//! Membership is a set: adding twice or removing a non-member is a
//! no-op success.

use axum::extract::{Path, State};
use axum::Json;

use bazaar_core::ProductId;

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::routes::ApiMessage;
use crate::state::AppState;

/// `POST /favorites/{product_id}`
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    let product_id = ProductId::new(product_id);

    if db::products::get_by_id(state.pool(), product_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("product not found".to_owned()));
    }

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::favorites::add(&mut *tx, user.id, product_id).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok(Json(ApiMessage::ok("Product added to favorites")))
}

/// `DELETE /favorites/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    let product_id = ProductId::new(product_id);

    if db::products::get_by_id(state.pool(), product_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("product not found".to_owned()));
    }

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::favorites::remove(&mut *tx, user.id, product_id).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok(Json(ApiMessage::ok("Product removed from favorites")))
}

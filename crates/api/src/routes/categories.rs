//! Category endpoints.

use std::collections::{HashMap, HashSet};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{CategoryId, ProductId};

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::Product;
use crate::routes::forms::MultipartForm;
use crate::routes::ApiMessage;
use crate::state::AppState;

/// Folder under the image store root for category images.
const CATEGORY_UPLOAD_FOLDER: &str = "categories";

#[derive(Debug, Serialize)]
pub struct CategoryProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_path: Option<String>,
    pub rating: Option<Decimal>,
    pub best_seller: i32,
    pub is_favorite: bool,
}

impl CategoryProduct {
    fn from_product(product: Product, favorites: &HashSet<ProductId>) -> Self {
        let is_favorite = favorites.contains(&product.id);
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_path: product.image_path,
            rating: product.rating,
            best_seller: product.best_seller,
            is_favorite,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryWithProducts {
    pub id: CategoryId,
    pub title: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub products: Vec<CategoryProduct>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub status: bool,
    pub categories: Vec<CategoryWithProducts>,
}

/// `GET /categories`
///
/// Every category with its products, each product flagged with whether
/// the caller has favorited it.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = db::categories::list_all(state.pool()).await?;
    let products = db::products::list_all(state.pool()).await?;
    let favorites = db::favorites::ids_for_user(state.pool(), user.id).await?;

    let mut by_category: HashMap<CategoryId, Vec<CategoryProduct>> = HashMap::new();
    for product in products {
        let category_id = product.category_id;
        by_category
            .entry(category_id)
            .or_default()
            .push(CategoryProduct::from_product(product, &favorites));
    }

    let categories = categories
        .into_iter()
        .map(|category| CategoryWithProducts {
            products: by_category.remove(&category.id).unwrap_or_default(),
            id: category.id,
            title: category.title,
            description: category.description,
            image_path: category.image_path,
        })
        .collect();

    Ok(Json(CategoriesResponse {
        status: true,
        categories,
    }))
}

/// `POST /new_category`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = MultipartForm::read(multipart).await?;

    let (Some(title), Some(description)) = (
        form.text("title").map(ToOwned::to_owned),
        form.text("description").map(ToOwned::to_owned),
    ) else {
        return Err(ApiError::BadRequest(
            "Title and description are required".to_owned(),
        ));
    };

    let Some(image) = form.take_image() else {
        return Err(ApiError::BadRequest("Image is required".to_owned()));
    };

    let image_path = state
        .images()
        .save(CATEGORY_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
        .await?;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::categories::create(&mut *tx, &title, &description, &image_path).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::ok("Category created successfully")),
    ))
}

#[derive(Debug, Serialize)]
pub struct CategoryPayload {
    pub id: CategoryId,
    pub title: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryUpdatedResponse {
    pub status: bool,
    pub message: String,
    pub category: CategoryPayload,
}

/// `PUT /category/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<CategoryUpdatedResponse>, ApiError> {
    let id = CategoryId::new(id);
    let mut form = MultipartForm::read(multipart).await?;

    let Some(mut category) = db::categories::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("category not found".to_owned()));
    };

    if let Some(title) = form.text("title") {
        category.title = title.to_owned();
    }
    if let Some(description) = form.text("description") {
        category.description = Some(description.to_owned());
    }

    let mut replaced_image = None;
    if let Some(image) = form.take_image() {
        let stored = state
            .images()
            .save(CATEGORY_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
            .await?;
        replaced_image = category.image_path.replace(stored);
    }

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::categories::update(&mut *tx, &category).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    if let Some(old) = replaced_image {
        state.images().delete_replaced(&old).await;
    }

    Ok(Json(CategoryUpdatedResponse {
        status: true,
        message: "category updated successfully".to_owned(),
        category: CategoryPayload {
            id: category.id,
            title: category.title,
            description: category.description,
            image_path: category.image_path,
        },
    }))
}

/// `DELETE /category/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    let id = CategoryId::new(id);

    let Some(category) = db::categories::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("category not found".to_owned()));
    };

    // Refuse before touching any stored file so a refused delete leaves
    // everything in place. The FK backstops the race.
    if db::orders::references_category(state.pool(), id).await? {
        return Err(ApiError::BadRequest(
            db::categories::ORDERED_DELETE_CONFLICT.to_owned(),
        ));
    }

    // The row delete cascades over the category's products, so collect
    // their image paths up front for cleanup afterwards.
    let product_images = db::products::image_paths_for_category(state.pool(), id).await?;

    crate::routes::delete_image_then_row(state.images(), category.image_path.as_deref(), || async {
        let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
        db::categories::delete(&mut *tx, id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;
        Ok(())
    })
    .await?;

    for path in &product_images {
        state.images().delete_replaced(path).await;
    }

    Ok(Json(ApiMessage::ok("category deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::CategoryId;

    fn product(id: i32, category_id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: None,
            price: Decimal::ZERO,
            image_path: None,
            rating: None,
            best_seller: 0,
            category_id: CategoryId::new(category_id),
        }
    }

    #[test]
    fn test_is_favorite_flag_reflects_membership() {
        let favorites: HashSet<ProductId> = [ProductId::new(7)].into_iter().collect();

        let favored = CategoryProduct::from_product(product(7, 1), &favorites);
        let plain = CategoryProduct::from_product(product(8, 1), &favorites);

        assert!(favored.is_favorite);
        assert!(!plain.is_favorite);
    }
}

//! Product endpoints.

use std::collections::HashSet;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, ProductId};

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{Category, Product};
use crate::routes::forms::MultipartForm;
use crate::routes::ApiMessage;
use crate::state::AppState;

/// Folder under the image store root for product images.
const PRODUCT_UPLOAD_FOLDER: &str = "products";

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub title: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

impl From<Category> for CategorySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            image_path: category.image_path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductPayload {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub price: Decimal,
    pub rating: Option<Decimal>,
    pub is_favorite: bool,
    /// Null when the joined category row is gone.
    pub category: Option<CategorySummary>,
}

impl ProductPayload {
    fn new(product: Product, category: Option<Category>, favorites: &HashSet<ProductId>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            image_path: product.image_path,
            price: product.price,
            rating: product.rating,
            is_favorite: favorites.contains(&product.id),
            category: category.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub status: bool,
    pub products: Vec<ProductPayload>,
}

#[derive(Debug, Serialize)]
pub struct BestSellersResponse {
    pub status: bool,
    pub best_seller_products: Vec<ProductPayload>,
}

async fn payloads(
    state: &AppState,
    user_id: bazaar_core::UserId,
    rows: Vec<(Product, Option<Category>)>,
) -> Result<Vec<ProductPayload>, RepositoryError> {
    let favorites = db::favorites::ids_for_user(state.pool(), user_id).await?;

    Ok(rows
        .into_iter()
        .map(|(product, category)| ProductPayload::new(product, category, &favorites))
        .collect())
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProductsResponse>, ApiError> {
    let rows = db::products::list_with_category(state.pool()).await?;
    let products = payloads(&state, user.id, rows).await?;

    Ok(Json(ProductsResponse {
        status: true,
        products,
    }))
}

/// `GET /top_rated_products`
///
/// The two highest-rated products.
pub async fn top_rated(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProductsResponse>, ApiError> {
    let rows = db::products::top_rated(state.pool()).await?;
    let products = payloads(&state, user.id, rows).await?;

    Ok(Json(ProductsResponse {
        status: true,
        products,
    }))
}

/// `GET /best_seller_products`
pub async fn best_sellers(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<BestSellersResponse>, ApiError> {
    let rows = db::products::best_sellers(state.pool()).await?;
    let best_seller_products = payloads(&state, user.id, rows).await?;

    Ok(Json(BestSellersResponse {
        status: true,
        best_seller_products,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

/// `GET /products/search?q=`
///
/// Case-insensitive substring match on the product name.
pub async fn search(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_owned()));
    }

    let rows = db::products::search_by_name(state.pool(), query).await?;
    let products = payloads(&state, user.id, rows).await?;

    Ok(Json(ProductsResponse {
        status: true,
        products,
    }))
}

/// `POST /new_product`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = MultipartForm::read(multipart).await?;

    let (Some(name), Some(description)) = (
        form.text("name").map(ToOwned::to_owned),
        form.text("description").map(ToOwned::to_owned),
    ) else {
        return Err(missing_product_fields());
    };

    let price = form
        .decimal("price", "Price must be a number")?
        .ok_or_else(missing_product_fields)?;
    let rating = form
        .decimal("rating", "Rating must be a number")?
        .ok_or_else(missing_product_fields)?;
    let category_id = form
        .integer("category_id", "Category id must be an integer number")?
        .map(CategoryId::new)
        .ok_or_else(missing_product_fields)?;
    let best_seller = form
        .integer("best_seller", "Best seller must be an integer number")?
        .unwrap_or(0);

    if price.is_sign_negative() {
        return Err(ApiError::BadRequest(
            "Price must be a non-negative number".to_owned(),
        ));
    }

    if db::categories::get_by_id(state.pool(), category_id)
        .await?
        .is_none()
    {
        return Err(ApiError::BadRequest("Category not found".to_owned()));
    }

    let Some(image) = form.take_image() else {
        return Err(ApiError::BadRequest("Image is required".to_owned()));
    };

    let image_path = state
        .images()
        .save(PRODUCT_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
        .await?;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::products::create(
        &mut *tx,
        db::products::NewProduct {
            name: &name,
            description: &description,
            price,
            rating,
            best_seller,
            category_id,
            image_path: &image_path,
        },
    )
    .await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::ok("product created successfully")),
    ))
}

fn missing_product_fields() -> ApiError {
    ApiError::BadRequest("Name, description, price, rating and category_id are required".to_owned())
}

/// `PUT /product/{id}`
///
/// Partial update. Absent fields keep their prior value.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiMessage>, ApiError> {
    let id = ProductId::new(id);
    let mut form = MultipartForm::read(multipart).await?;

    let Some(mut product) = db::products::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("product not found".to_owned()));
    };

    if let Some(name) = form.text("name") {
        product.name = name.to_owned();
    }
    if let Some(description) = form.text("description") {
        product.description = Some(description.to_owned());
    }
    if let Some(price) = form.decimal("price", "Price must be a number")? {
        if price.is_sign_negative() {
            return Err(ApiError::BadRequest(
                "Price must be a non-negative number".to_owned(),
            ));
        }
        product.price = price;
    }
    if let Some(rating) = form.decimal("rating", "Rating must be a number")? {
        product.rating = Some(rating);
    }
    if let Some(best_seller) = form.integer("best_seller", "Best seller must be an integer number")?
    {
        product.best_seller = best_seller;
    }
    if let Some(category_id) = form
        .integer("category_id", "Category id must be an integer number")?
        .map(CategoryId::new)
    {
        if db::categories::get_by_id(state.pool(), category_id)
            .await?
            .is_none()
        {
            return Err(ApiError::BadRequest("Category not found".to_owned()));
        }
        product.category_id = category_id;
    }

    let mut replaced_image = None;
    if let Some(image) = form.take_image() {
        let stored = state
            .images()
            .save(PRODUCT_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
            .await?;
        replaced_image = product.image_path.replace(stored);
    }

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::products::update(&mut *tx, &product).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    if let Some(old) = replaced_image {
        state.images().delete_replaced(&old).await;
    }

    Ok(Json(ApiMessage::ok("product updated successfully")))
}

/// `DELETE /product/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    let id = ProductId::new(id);

    let Some(product) = db::products::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("product not found".to_owned()));
    };

    // Refuse before touching the image so a refused delete leaves both the
    // row and its stored file in place. The FK backstops the race.
    if db::orders::references_product(state.pool(), id).await? {
        return Err(ApiError::BadRequest(
            db::products::ORDERED_DELETE_CONFLICT.to_owned(),
        ));
    }

    crate::routes::delete_image_then_row(state.images(), product.image_path.as_deref(), || async {
        let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
        db::products::delete(&mut *tx, id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;
        Ok(())
    })
    .await?;

    Ok(Json(ApiMessage::ok("product deleted successfully")))
}

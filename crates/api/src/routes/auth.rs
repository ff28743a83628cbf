//! Account and session endpoints.

use axum::extract::{Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, UserId};

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::{RequireRefresh, RequireUser};
use crate::models::{Product, User};
use crate::routes::forms::MultipartForm;
use crate::routes::ApiMessage;
use crate::services::auth as auth_service;
use crate::state::AppState;

/// Folder under the image store root for profile pictures.
const USER_UPLOAD_FOLDER: &str = "users";

/// A product as it appears inside a user profile.
#[derive(Debug, Serialize)]
pub struct FavoriteProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_path: Option<String>,
    pub rating: Option<Decimal>,
    pub best_seller: i32,
}

impl From<Product> for FavoriteProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_path: product.image_path,
            rating: product.rating,
            best_seller: product.best_seller,
        }
    }
}

/// The profile payload returned by login and `/get_user_data`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub image_path: Option<String>,
    pub favorite_products: Vec<FavoriteProduct>,
}

impl UserProfile {
    async fn load(state: &AppState, user: &User) -> Result<Self, RepositoryError> {
        let favorites = db::favorites::products_for_user(state.pool(), user.id).await?;

        Ok(Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            image_path: user.image_path.clone(),
            favorite_products: favorites.into_iter().map(Into::into).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = request.email.trim();
    let password = request.password.trim();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_owned(),
        ));
    }

    let Some(user) = db::users::get_by_email(state.pool(), email).await? else {
        return Err(ApiError::Unauthorized("Wrong email".to_owned()));
    };

    let matches = auth_service::verify_password(password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::Unauthorized("Wrong password".to_owned()));
    }

    let access_token = state
        .tokens()
        .issue_access(user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .tokens()
        .issue_refresh(user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let profile = UserProfile::load(&state, &user).await?;

    Ok(Json(LoginResponse {
        status: true,
        access_token,
        refresh_token,
        user: profile,
    }))
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = MultipartForm::read(multipart).await?;

    let (Some(name), Some(email), Some(phone), Some(password)) = (
        form.text("name").map(ToOwned::to_owned),
        form.text("email").map(ToOwned::to_owned),
        form.text("phone").map(ToOwned::to_owned),
        form.text("password").map(ToOwned::to_owned),
    ) else {
        return Err(ApiError::BadRequest(
            "name, password, email and phone are required".to_owned(),
        ));
    };

    // Pre-checks give friendly messages; the unique constraints stay the
    // source of truth for concurrent registrations.
    if db::users::email_exists(state.pool(), &email).await? {
        return Err(ApiError::BadRequest("Email already exists".to_owned()));
    }
    if db::users::phone_exists(state.pool(), &phone).await? {
        return Err(ApiError::BadRequest(
            "Phone number already exists".to_owned(),
        ));
    }

    auth_service::validate_password(&password).map_err(|_| {
        ApiError::BadRequest("Password must be at least 6 characters long".to_owned())
    })?;
    let password_hash =
        auth_service::hash_password(&password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let image_path = match form.take_image() {
        Some(image) => Some(
            state
                .images()
                .save(USER_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
                .await?,
        ),
        None => None,
    };

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::users::create(
        &mut *tx,
        &name,
        &email,
        &phone,
        &password_hash,
        image_path.as_deref(),
    )
    .await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::ok("User Registered successfully")),
    ))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: bool,
    pub access_token: String,
}

/// `POST /refresh_token`
pub async fn refresh(
    State(state): State<AppState>,
    RequireRefresh(user_id): RequireRefresh,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access_token = state
        .tokens()
        .issue_access(user_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RefreshResponse {
        status: true,
        access_token,
    }))
}

#[derive(Debug, Serialize)]
pub struct UserDataResponse {
    pub status: bool,
    pub user: UserProfile,
}

/// `GET /get_user_data`
pub async fn get_user_data(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<UserDataResponse>, ApiError> {
    let profile = UserProfile::load(&state, &user).await?;

    Ok(Json(UserDataResponse {
        status: true,
        user: profile,
    }))
}

/// `PUT /update_profile`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Json<ApiMessage>, ApiError> {
    let mut form = MultipartForm::read(multipart).await?;

    if form.text("name").is_none() && form.text("phone").is_none() && !form.has_image() {
        return Err(ApiError::BadRequest(
            "Nothing to update. Please provide a name, phone or image to update.".to_owned(),
        ));
    }

    let name = form.text("name").unwrap_or(&user.name).to_owned();
    let phone = form.text("phone").unwrap_or(&user.phone).to_owned();

    let mut replaced_image = None;
    let image_path = match form.take_image() {
        Some(image) => {
            let stored = state
                .images()
                .save(USER_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
                .await?;
            replaced_image = user.image_path.clone();
            Some(stored)
        }
        None => user.image_path.clone(),
    };

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::users::update_profile(&mut *tx, user.id, &name, &phone, image_path.as_deref()).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    // Old image cleanup only after the row change is durable.
    if let Some(old) = replaced_image {
        state.images().delete_replaced(&old).await;
    }

    Ok(Json(ApiMessage::ok("User information updated successfully")))
}

/// `DELETE /delete_user`
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ApiMessage>, ApiError> {
    crate::routes::delete_image_then_row(state.images(), user.image_path.as_deref(), || async {
        let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
        db::users::delete(&mut *tx, user.id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;
        Ok(())
    })
    .await?;

    Ok(Json(ApiMessage::ok("User deleted successfully")))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    new_password_confirm: String,
}

/// `POST /change_password`
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(request): Form<ChangePasswordRequest>,
) -> Result<Json<ApiMessage>, ApiError> {
    let current_password = request.current_password.trim();
    let new_password = request.new_password.trim();
    let new_password_confirm = request.new_password_confirm.trim();

    if current_password.is_empty() || new_password.is_empty() || new_password_confirm.is_empty() {
        return Err(ApiError::BadRequest(
            "Current password, new password and new password confirmation are required".to_owned(),
        ));
    }

    if new_password.len() < auth_service::MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(
            "New password must be at least 6 characters long".to_owned(),
        ));
    }

    if new_password != new_password_confirm {
        return Err(ApiError::BadRequest(
            "New password and new password confirmation do not match".to_owned(),
        ));
    }

    let matches = auth_service::verify_password(current_password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_owned(),
        ));
    }

    let password_hash = auth_service::hash_password(new_password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::users::update_password(&mut *tx, user.id, &password_hash).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok(Json(ApiMessage::ok("Password changed successfully")))
}

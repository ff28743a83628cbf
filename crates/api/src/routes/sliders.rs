//! Slider endpoints.
//!
//! Listing and detail are public. Mutations require an access token.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use bazaar_core::SliderId;

use crate::db::{self, RepositoryError};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::Slider;
use crate::routes::forms::MultipartForm;
use crate::routes::ApiMessage;
use crate::state::AppState;

/// Folder under the image store root for slider images.
const SLIDER_UPLOAD_FOLDER: &str = "sliders";

#[derive(Debug, Serialize)]
pub struct SliderPayload {
    pub id: SliderId,
    pub title: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

impl From<Slider> for SliderPayload {
    fn from(slider: Slider) -> Self {
        Self {
            id: slider.id,
            title: slider.title,
            description: slider.description,
            image_path: slider.image_path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlidersResponse {
    pub status: bool,
    pub sliders: Vec<SliderPayload>,
}

#[derive(Debug, Serialize)]
pub struct SliderResponse {
    pub status: bool,
    pub slider: SliderPayload,
}

#[derive(Debug, Serialize)]
pub struct SliderUpdatedResponse {
    pub status: bool,
    pub message: String,
    pub slider: SliderPayload,
}

/// `GET /sliders`
pub async fn list(State(state): State<AppState>) -> Result<Json<SlidersResponse>, ApiError> {
    let sliders = db::sliders::list_all(state.pool()).await?;

    Ok(Json(SlidersResponse {
        status: true,
        sliders: sliders.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /slider/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SliderResponse>, ApiError> {
    let Some(slider) = db::sliders::get_by_id(state.pool(), SliderId::new(id)).await? else {
        return Err(ApiError::NotFound("Slider not found".to_owned()));
    };

    Ok(Json(SliderResponse {
        status: true,
        slider: slider.into(),
    }))
}

/// `POST /new_slider`
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
        .save(SLIDER_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
        .await?;

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::sliders::create(&mut *tx, &title, &description, &image_path).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::ok("Slider created successfully")),
    ))
}

/// `PUT /slider/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<SliderUpdatedResponse>, ApiError> {
    let id = SliderId::new(id);
    let mut form = MultipartForm::read(multipart).await?;

    let Some(mut slider) = db::sliders::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("Slider not found".to_owned()));
    };

    if let Some(title) = form.text("title") {
        slider.title = title.to_owned();
    }
    if let Some(description) = form.text("description") {
        slider.description = Some(description.to_owned());
    }

    let mut replaced_image = None;
    if let Some(image) = form.take_image() {
        let stored = state
            .images()
            .save(SLIDER_UPLOAD_FOLDER, image.file_name.as_deref(), &image.bytes)
            .await?;
        replaced_image = slider.image_path.replace(stored);
    }

    let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
    db::sliders::update(&mut *tx, &slider).await?;
    tx.commit().await.map_err(RepositoryError::Database)?;

    if let Some(old) = replaced_image {
        state.images().delete_replaced(&old).await;
    }

    Ok(Json(SliderUpdatedResponse {
        status: true,
        message: "Slider updated successfully".to_owned(),
        slider: slider.into(),
    }))
}

/// `DELETE /slider/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, ApiError> {
    let id = SliderId::new(id);

    let Some(slider) = db::sliders::get_by_id(state.pool(), id).await? else {
        return Err(ApiError::NotFound("Slider not found".to_owned()));
    };

    crate::routes::delete_image_then_row(state.images(), slider.image_path.as_deref(), || async {
        let mut tx = state.pool().begin().await.map_err(RepositoryError::Database)?;
        db::sliders::delete(&mut *tx, id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;
        Ok(())
    })
    .await?;

    Ok(Json(ApiMessage::ok("Slider deleted successfully")))
}

//! HTTP route handlers.
//!
//! Every response carries a `status` boolean alongside its payload, and
//! errors render through [`crate::error::ApiError`] with the same shape.

pub mod auth;
pub mod categories;
pub mod favorites;
pub mod forms;
pub mod orders;
pub mod products;
pub mod sliders;

use std::future::Future;

use axum::Router;
use axum::routing::{get, post, put};
use serde::Serialize;

use crate::error::ApiError;
use crate::services::images::ImageStore;
use crate::state::AppState;

/// The plain success envelope used by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }
}

/// Remove a row's stored image, then run the row delete.
///
/// The image goes first; a store failure aborts before `delete_row` runs,
/// so the row survives with its image path intact and the client sees the
/// store error.
pub(crate) async fn delete_image_then_row<F, Fut>(
    images: &ImageStore,
    image_path: Option<&str>,
    delete_row: F,
) -> Result<(), ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
{
    if let Some(path) = image_path {
        images.delete(path).await?;
    }
    delete_row().await
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Account and session management.
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh_token", post(auth::refresh))
        .route("/get_user_data", get(auth::get_user_data))
        .route("/update_profile", put(auth::update_profile))
        .route(
            "/delete_user",
            get(auth::delete_user).delete(auth::delete_user),
        )
        .route("/change_password", post(auth::change_password))
        // Categories.
        .route("/categories", get(categories::list))
        .route("/new_category", post(categories::create))
        .route(
            "/category/{id}",
            put(categories::update).delete(categories::delete),
        )
        // Products.
        .route("/products", get(products::list))
        .route("/top_rated_products", get(products::top_rated))
        .route("/best_seller_products", get(products::best_sellers))
        .route("/products/search", get(products::search))
        .route("/new_product", post(products::create))
        .route(
            "/product/{id}",
            put(products::update).delete(products::delete),
        )
        // Sliders.
        .route("/sliders", get(sliders::list))
        .route("/new_slider", post(sliders::create))
        .route(
            "/slider/{id}",
            get(sliders::get_one)
                .put(sliders::update)
                .delete(sliders::delete),
        )
        // Orders.
        .route("/place_order", post(orders::place))
        .route("/orders", get(orders::list))
        .route("/orders/cancel/{id}", post(orders::cancel))
        .route("/orders/complete/{id}", post(orders::complete))
        // Favorites.
        .route(
            "/favorites/{product_id}",
            post(favorites::add).delete(favorites::remove),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_api_message_serializes_envelope() {
        let message = ApiMessage::ok("Category created successfully");
        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(json["status"], true);
        assert_eq!(json["message"], "Category created successfully");
    }

    fn temp_store() -> ImageStore {
        ImageStore::new(std::env::temp_dir().join(format!("bazaar-routes-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_failed_image_delete_aborts_row_delete() {
        let store = temp_store();
        // A directory at the stored path makes file removal fail.
        tokio::fs::create_dir_all(store.root().join("products/stuck.png"))
            .await
            .expect("create blocking directory");

        let row_deleted = AtomicBool::new(false);
        let result = delete_image_then_row(&store, Some("products/stuck.png"), || async {
            row_deleted.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ApiError::ImageStore(_))));
        assert!(
            !row_deleted.load(Ordering::SeqCst),
            "row delete must not run after the image delete fails"
        );
    }

    #[tokio::test]
    async fn test_image_delete_precedes_row_delete() {
        let store = temp_store();
        let path = store
            .save("products", Some("photo.png"), b"bytes")
            .await
            .expect("save");

        let image_was_gone = AtomicBool::new(false);
        delete_image_then_row(&store, Some(path.as_str()), || async {
            image_was_gone.store(!store.root().join(&path).exists(), Ordering::SeqCst);
            Ok(())
        })
        .await
        .expect("delete succeeds");

        assert!(image_was_gone.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_rows_without_images_delete_directly() {
        let store = temp_store();
        let row_deleted = AtomicBool::new(false);
        delete_image_then_row(&store, None, || async {
            row_deleted.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .expect("delete succeeds");

        assert!(row_deleted.load(Ordering::SeqCst));
    }
}

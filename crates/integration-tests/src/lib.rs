//! Shared helpers for Bazaar API integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! # Start `PostgreSQL` and the API server first
//! cargo run -p bazaar-api
//!
//! # Then run the ignored integration tests
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! The server under test is located via `BAZAAR_BASE_URL`
//! (default `http://localhost:3000`).

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use uuid::Uuid;

/// A 1x1 transparent PNG, enough to satisfy image-required endpoints.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("BAZAAR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A fresh email that won't collide with prior test runs.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// A fresh phone number that won't collide with prior test runs.
#[must_use]
pub fn unique_phone() -> String {
    // 15 digits derived from a UUID keeps the unique constraint happy.
    let digits: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(15)
        .collect();
    format!("+{digits}")
}

/// An authenticated session against the API under test.
pub struct Session {
    pub client: Client,
    pub base_url: String,
    pub access_token: String,
    pub refresh_token: String,
    pub email: String,
    pub password: String,
}

impl Session {
    /// Register a fresh user and log in.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or registration/login fail.
    pub async fn register_and_login() -> Self {
        let client = Client::new();
        let base_url = base_url();
        let email = unique_email();
        let phone = unique_phone();
        let password = "hunter2-integration".to_owned();

        let form = Form::new()
            .text("name", "Integration Tester")
            .text("email", email.clone())
            .text("phone", phone)
            .text("password", password.clone());
        let resp = client
            .post(format!("{base_url}/register"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to register test user");
        assert_eq!(resp.status(), 201, "registration must succeed");

        let resp = client
            .post(format!("{base_url}/login"))
            .form(&[("email", email.as_str()), ("password", password.as_str())])
            .send()
            .await
            .expect("Failed to log in test user");
        assert_eq!(resp.status(), 200, "login must succeed");

        let body: Value = resp.json().await.expect("Failed to parse login response");
        let access_token = body["access_token"]
            .as_str()
            .expect("login response carries access_token")
            .to_owned();
        let refresh_token = body["refresh_token"]
            .as_str()
            .expect("login response carries refresh_token")
            .to_owned();

        Self {
            client,
            base_url,
            access_token,
            refresh_token,
            email,
            password,
        }
    }

    /// Authenticated GET.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .expect("Failed to send GET request")
    }

    /// Authenticated POST with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request")
    }

    /// Authenticated POST with a multipart body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send POST request")
    }

    /// Authenticated PUT with a multipart body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn put_multipart(&self, path: &str, form: Form) -> Response {
        self.client
            .put(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send PUT request")
    }

    /// Authenticated DELETE.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .expect("Failed to send DELETE request")
    }
}

/// A multipart image part built from the embedded test PNG.
#[must_use]
pub fn test_image() -> Part {
    Part::bytes(TINY_PNG.to_vec())
        .file_name("test.png")
        .mime_str("image/png")
        .expect("static mime type is valid")
}

/// Create a category and return its id, so product tests have a parent row.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_category(session: &Session) -> i64 {
    let title = format!("Category {}", Uuid::new_v4());
    let form = Form::new()
        .text("title", title.clone())
        .text("description", "integration test category")
        .part("image", test_image());
    let resp = session.post_multipart("/new_category", form).await;
    assert_eq!(resp.status(), 201, "category creation must succeed");

    // Creation doesn't echo the row back, so find it in the listing.
    let resp = session.get("/categories").await;
    let body: Value = resp.json().await.expect("Failed to parse categories");
    body["categories"]
        .as_array()
        .expect("categories is an array")
        .iter()
        .find(|c| c["title"] == title.as_str())
        .and_then(|c| c["id"].as_i64())
        .expect("created category appears in the listing")
}

/// Create a product in the given category and return its id.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_product(session: &Session, category_id: i64, price: &str) -> i64 {
    create_product_rated(session, category_id, price, "4.5", 0).await
}

/// Create a product with an explicit rating and best-seller flag.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_product_rated(
    session: &Session,
    category_id: i64,
    price: &str,
    rating: &str,
    best_seller: i32,
) -> i64 {
    // No spaces so the name can go straight into a query string.
    let name = format!("product-{}", Uuid::new_v4());
    let form = Form::new()
        .text("name", name.clone())
        .text("description", "integration test product")
        .text("price", price.to_owned())
        .text("rating", rating.to_owned())
        .text("best_seller", best_seller.to_string())
        .text("category_id", category_id.to_string())
        .part("image", test_image());
    let resp = session.post_multipart("/new_product", form).await;
    assert_eq!(resp.status(), 201, "product creation must succeed");

    let resp = session.get(&format!("/products/search?q={name}")).await;
    let body: Value = resp.json().await.expect("Failed to parse search results");
    body["products"]
        .as_array()
        .expect("products is an array")
        .first()
        .and_then(|p| p["id"].as_i64())
        .expect("created product appears in search")
}

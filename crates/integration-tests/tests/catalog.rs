//! Integration tests for categories, products and sliders.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p bazaar-api)
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use bazaar_integration_tests::{
    base_url, create_category, create_product, create_product_rated, test_image, Session,
};
use reqwest::multipart::Form;
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_create_requires_image() {
    let session = Session::register_and_login().await;

    let form = Form::new()
        .text("title", "No Image Category")
        .text("description", "should fail");
    let resp = session.post_multipart("/new_category", form).await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["status"], false);
    assert_eq!(body["message"], "Image is required");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_listing_embeds_products_with_favorite_flag() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "10.00").await;

    let resp = session
        .post_json(&format!("/favorites/{product_id}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = session.get("/categories").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse categories");

    let category = body["categories"]
        .as_array()
        .expect("categories array")
        .iter()
        .find(|c| c["id"].as_i64() == Some(category_id))
        .expect("created category present");
    let product = category["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("created product nested under its category");

    assert_eq!(product["is_favorite"], true);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_create_validates_numeric_fields() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;

    let form = Form::new()
        .text("name", format!("bad-price-{}", Uuid::new_v4()))
        .text("description", "bad price")
        .text("price", "not-a-number")
        .text("rating", "4.0")
        .text("category_id", category_id.to_string())
        .part("image", test_image());
    let resp = session.post_multipart("/new_product", form).await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Price must be a number");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_update_is_partial() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "10.00").await;

    // Only the price changes; everything else keeps its value.
    let form = Form::new().text("price", "12.50");
    let resp = session
        .put_multipart(&format!("/product/{product_id}"), form)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = session.get("/products").await;
    let body: Value = resp.json().await.expect("parse products");
    let product = body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("product present");

    assert_eq!(product["price"], "12.50");
    assert_eq!(product["description"], "integration test product");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_search_is_case_insensitive() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "5.00").await;

    // Search for the generated name in uppercase.
    let resp = session.get("/products").await;
    let body: Value = resp.json().await.expect("parse products");
    let name = body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .and_then(|p| p["name"].as_str())
        .expect("product present")
        .to_uppercase();

    let resp = session.get(&format!("/products/search?q={name}")).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse search results");
    let found = body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .any(|p| p["id"].as_i64() == Some(product_id));
    assert!(found, "uppercase query must match");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_top_rated_returns_two_highest_ratings() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;

    // Ratings well above what other tests create, so the top two slots are
    // contested only by rows rated like these.
    create_product_rated(&session, category_id, "10.00", "9.9", 0).await;
    create_product_rated(&session, category_id, "10.00", "9.8", 0).await;
    let third = create_product_rated(&session, category_id, "10.00", "9.7", 0).await;

    let resp = session.get("/top_rated_products").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse top rated");
    let products = body["products"].as_array().expect("products array");

    assert_eq!(products.len(), 2, "top rated is capped at two products");

    let ratings: Vec<f64> = products
        .iter()
        .map(|p| {
            p["rating"]
                .as_str()
                .expect("rating present")
                .parse()
                .expect("rating parses")
        })
        .collect();
    assert!(ratings[0] >= ratings[1], "ratings must be descending");
    assert!(
        ratings.iter().all(|&r| r >= 9.8),
        "two products rated 9.8+ exist, so nothing lower makes the cut"
    );
    assert!(
        products.iter().all(|p| p["id"].as_i64() != Some(third)),
        "the third-rated product never appears"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_best_sellers_lists_only_flagged_products() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let flagged = create_product_rated(&session, category_id, "10.00", "4.5", 1).await;
    let plain = create_product_rated(&session, category_id, "10.00", "4.5", 0).await;

    let resp = session.get("/best_seller_products").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse best sellers");
    let ids: Vec<i64> = body["best_seller_products"]
        .as_array()
        .expect("best_seller_products array")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();

    assert!(ids.contains(&flagged), "flagged product is listed");
    assert!(!ids.contains(&plain), "unflagged product is not");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_search_requires_query() {
    let session = Session::register_and_login().await;

    let resp = session.get("/products/search").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Search query is required");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_delete_then_missing() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "3.00").await;

    let resp = session.delete(&format!("/product/{product_id}")).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse body");
    assert_eq!(body["message"], "product deleted successfully");

    let resp = session.delete(&format!("/product/{product_id}")).await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_sliders_are_public() {
    // No token at all.
    let client = Client::new();
    let resp = client
        .get(format!("{}/sliders", base_url()))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse sliders");
    assert_eq!(body["status"], true);
    assert!(body["sliders"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_slider_crud_roundtrip() {
    let session = Session::register_and_login().await;
    let title = format!("Slider {}", Uuid::new_v4());

    let form = Form::new()
        .text("title", title.clone())
        .text("description", "integration test slider")
        .part("image", test_image());
    let resp = session.post_multipart("/new_slider", form).await;
    assert_eq!(resp.status(), 201);

    let client = Client::new();
    let resp = client
        .get(format!("{}/sliders", base_url()))
        .send()
        .await
        .expect("send request");
    let body: Value = resp.json().await.expect("parse sliders");
    let slider_id = body["sliders"]
        .as_array()
        .expect("sliders array")
        .iter()
        .find(|s| s["title"] == title.as_str())
        .and_then(|s| s["id"].as_i64())
        .expect("created slider present");

    let form = Form::new().text("description", "updated description");
    let resp = session
        .put_multipart(&format!("/slider/{slider_id}"), form)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse body");
    assert_eq!(body["slider"]["description"], "updated description");

    let resp = session.delete(&format!("/slider/{slider_id}")).await;
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{}/slider/{slider_id}", base_url()))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Slider not found");
}

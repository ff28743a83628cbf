//! Integration tests for the favorites set.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p bazaar-api)
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use bazaar_integration_tests::{create_category, create_product, Session};
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_favorite_set_semantics() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "7.00").await;

    // Adding twice is a no-op success.
    for _ in 0..2 {
        let resp = session
            .post_json(&format!("/favorites/{product_id}"), &Value::Null)
            .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = session.get("/get_user_data").await;
    let body: Value = resp.json().await.expect("parse profile");
    let favorites = body["user"]["favorite_products"]
        .as_array()
        .expect("favorites array");
    let occurrences = favorites
        .iter()
        .filter(|p| p["id"].as_i64() == Some(product_id))
        .count();
    assert_eq!(occurrences, 1, "set semantics, no duplicates");

    // Removing twice is also a no-op success.
    for _ in 0..2 {
        let resp = session.delete(&format!("/favorites/{product_id}")).await;
        assert_eq!(resp.status(), 200);
    }

    let resp = session.get("/get_user_data").await;
    let body: Value = resp.json().await.expect("parse profile");
    let gone = body["user"]["favorite_products"]
        .as_array()
        .expect("favorites array")
        .iter()
        .all(|p| p["id"].as_i64() != Some(product_id));
    assert!(gone);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_favorite_unknown_product_is_not_found() {
    let session = Session::register_and_login().await;

    let resp = session
        .post_json("/favorites/999999999", &Value::Null)
        .await;

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_favorites_are_per_user() {
    let alice = Session::register_and_login().await;
    let category_id = create_category(&alice).await;
    let product_id = create_product(&alice, category_id, "7.00").await;

    let resp = alice
        .post_json(&format!("/favorites/{product_id}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 200);

    let bob = Session::register_and_login().await;
    let resp = bob.get("/products").await;
    let body: Value = resp.json().await.expect("parse products");
    let product = body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("product present");

    assert_eq!(product["is_favorite"], false);
}

//! Integration tests for order placement and lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p bazaar-api)
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use bazaar_integration_tests::{create_category, create_product, Session};
use serde_json::{json, Value};

async fn place_order(session: &Session, product_id: i64, quantity: i64) -> i64 {
    let resp = session
        .post_json(
            "/place_order",
            &json!({"items": [{"product_id": product_id, "quantity": quantity}]}),
        )
        .await;
    assert_eq!(resp.status(), 201, "order placement must succeed");
    let body: Value = resp.json().await.expect("parse order response");
    assert_eq!(body["status"], true);
    assert_eq!(body["message"], "Order placed successfully");
    body["order_id"].as_i64().expect("order_id present")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_place_order_totals_use_price_snapshot() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "10.00").await;

    let order_id = place_order(&session, product_id, 2).await;

    // Change the live price after placement.
    let form = reqwest::multipart::Form::new().text("price", "99.00");
    let resp = session
        .put_multipart(&format!("/product/{product_id}"), form)
        .await;
    assert_eq!(resp.status(), 200);

    // The order keeps the snapshot.
    let resp = session.get("/orders").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse orders");
    let order = body["orders"]["active"]
        .as_array()
        .expect("active orders array")
        .iter()
        .find(|o| o["id"].as_i64() == Some(order_id))
        .expect("placed order is active");

    assert_eq!(order["total"], "20.00");
    let item = &order["items"][0];
    assert_eq!(item["price"], "10.00");
    assert_eq!(item["quantity"], 2);
    assert_eq!(item["total_price"], "20.00");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_place_order_rejects_empty_and_bad_items() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "2.00").await;

    let resp = session.post_json("/place_order", &json!({"items": []})).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "No items in order");

    let resp = session
        .post_json(
            "/place_order",
            &json!({"items": [{"product_id": 999_999_999, "quantity": 1}]}),
        )
        .await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Product ID 999999999 not found");

    let resp = session
        .post_json(
            "/place_order",
            &json!({"items": [{"product_id": product_id, "quantity": 0}]}),
        )
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert!(body["message"]
        .as_str()
        .is_some_and(|m| m.starts_with("Invalid quantity for product")));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_listing_groups_by_status() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "1.00").await;

    let active = place_order(&session, product_id, 1).await;
    let completed = place_order(&session, product_id, 1).await;
    let canceled = place_order(&session, product_id, 1).await;

    let resp = session
        .post_json(&format!("/orders/complete/{completed}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 200);
    let resp = session
        .post_json(&format!("/orders/cancel/{canceled}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = session.get("/orders").await;
    let body: Value = resp.json().await.expect("parse orders");

    let ids = |group: &str| -> Vec<i64> {
        body["orders"][group]
            .as_array()
            .expect("group array")
            .iter()
            .filter_map(|o| o["id"].as_i64())
            .collect()
    };
    assert!(ids("active").contains(&active));
    assert!(ids("completed").contains(&completed));
    assert!(ids("canceled").contains(&canceled));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_listing_empty_is_not_found() {
    let session = Session::register_and_login().await;

    let resp = session.get("/orders").await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "No orders found");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_terminal_status_transitions_are_rejected() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "1.00").await;
    let order_id = place_order(&session, product_id, 1).await;

    let resp = session
        .post_json(&format!("/orders/cancel/{order_id}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 200);

    // Canceling again is idempotent-rejected, completing is forbidden.
    let resp = session
        .post_json(&format!("/orders/cancel/{order_id}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Order is already canceled");

    let resp = session
        .post_json(&format!("/orders/complete/{order_id}"), &Value::Null)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Canceled orders cannot be completed");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_ordered_product_cannot_be_deleted() {
    let session = Session::register_and_login().await;
    let category_id = create_category(&session).await;
    let product_id = create_product(&session, category_id, "10.00").await;
    let order_id = place_order(&session, product_id, 1).await;

    let resp = session.delete(&format!("/product/{product_id}")).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(
        body["message"],
        "Product has existing orders and cannot be deleted"
    );

    // The row survives and so does the order history.
    let resp = session.get("/products").await;
    let body: Value = resp.json().await.expect("parse products");
    assert!(body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .any(|p| p["id"].as_i64() == Some(product_id)));

    let resp = session.get("/orders").await;
    let body: Value = resp.json().await.expect("parse orders");
    assert!(body["orders"]["active"]
        .as_array()
        .expect("active orders array")
        .iter()
        .any(|o| o["id"].as_i64() == Some(order_id)));

    let resp = session.delete(&format!("/category/{category_id}")).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(
        body["message"],
        "Category has products with existing orders and cannot be deleted"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_are_scoped_to_their_owner() {
    let owner = Session::register_and_login().await;
    let category_id = create_category(&owner).await;
    let product_id = create_product(&owner, category_id, "1.00").await;
    let order_id = place_order(&owner, product_id, 1).await;

    let stranger = Session::register_and_login().await;
    let resp = stranger
        .post_json(&format!("/orders/cancel/{order_id}"), &Value::Null)
        .await;

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.expect("parse error body");
    assert_eq!(body["message"], "Order not found");
}

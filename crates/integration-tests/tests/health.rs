//! Health endpoint smoke tests.
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use bazaar_integration_tests::base_url;
use reqwest::Client;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_liveness() {
    let resp = Client::new()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_readiness_checks_database() {
    let resp = Client::new()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status(), 200);
}

//! Integration tests for sign-in, the auth gate and listing parameters.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`bozor-cli migrate`)
//! - The admin server running (`cargo run -p bozor-admin`)
//! - `BOZOR_TEST_LOGIN` / `BOZOR_TEST_PASSWORD` for an existing user

use reqwest::{Client, StatusCode};
use serde_json::json;

use bozor_integration_tests::{TestClient, base_url, read};

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_sign_in_rejects_wrong_password() {
    let (status, body) = read(
        Client::new()
            .post(format!("{}/api/v1/admin/auth/sign-in", base_url()))
            .json(&json!({ "login": "admin", "password": "definitely-not-it" }))
            .send()
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_routes_require_token() {
    let (status, _) = read(
        Client::new()
            .get(format!("{}/api/v1/admin/category/list", base_url()))
            .send()
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_limit_bounds_result_count() {
    let client = TestClient::sign_in().await;

    for path in [
        "/admin/order-status/list?limit=3",
        "/admin/payment-status/list?limit=2",
    ] {
        let (status, body) = client.get(path).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().expect("data is not a list");
        assert!(rows.len() <= 3, "{path} returned {} rows", rows.len());
    }

    let (_, all) = client.get("/admin/order-status/list").await;
    let listed = all["data"].as_array().map_or(0, Vec::len);
    assert_eq!(all["count"], listed);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_invalid_listing_parameters() {
    let client = TestClient::sign_in().await;

    let (status, body) = client.get("/admin/category/list?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Limit must be number!");

    let (status, body) = client.get("/admin/category/list?offset=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Offset must be number!");
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_bootstrap_admin_cannot_be_touched() {
    let client = TestClient::sign_in().await;

    let (status, body) = client.get("/admin/user/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid user id");

    let (status, _) = client.delete("/admin/user/delete/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, users) = client.get("/admin/user/list").await;
    let ids: Vec<i64> = users["data"]
        .as_array()
        .expect("data is not a list")
        .iter()
        .filter_map(|user| user["id"].as_i64())
        .collect();
    assert!(!ids.contains(&1));
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_lookups() {
    let client = TestClient::sign_in().await;

    let (status, roles) = client.get("/admin/role/list").await;
    assert_eq!(status, StatusCode::OK);
    assert!(roles["count"].as_i64().unwrap_or_default() >= 1);

    let (status, regions) = client.get("/admin/region/list").await;
    assert_eq!(status, StatusCode::OK);
    assert!(regions["data"]["results"].is_array());
}

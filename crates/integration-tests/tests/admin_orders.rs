//! Integration tests for orders, carts and wishlists.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`bozor-cli migrate`)
//! - The admin server running (`cargo run -p bozor-admin`)
//! - `BOZOR_TEST_LOGIN` / `BOZOR_TEST_PASSWORD` for an existing user
//!
//! Orders, carts and wishlists belong to the signed-in user.

use reqwest::StatusCode;
use serde_json::{Value, json};

use bozor_integration_tests::{TestClient, created_id};

async fn my_orders(client: &TestClient, customer_id: i64) -> Vec<Value> {
    let (status, body) = client
        .get(&format!("/order/list?customer_id={customer_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["results"]
        .as_array()
        .cloned()
        .expect("results is not a list")
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_order_total_and_item_count() {
    let client = TestClient::sign_in().await;

    let (status, body) = client
        .post(
            "/order/create",
            &json!({
                "order_status": 1,
                "items": [
                    { "product_id": 1, "quantity": 2, "price": 1000 },
                    { "product_id": 2, "quantity": 1, "price": 500 },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = created_id(&body);

    let (status, detail) = client.get(&format!("/order/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["total_amount"].as_f64(), Some(2500.0));
    assert_eq!(detail["data"]["items_count"], 2);
    assert!(detail["data"]["delivery_date"].is_string());
    assert_eq!(detail["data"]["payment_status"]["key"], "pending");

    let customer_id = detail["data"]["customer_id"].as_i64().expect("customer_id");
    let orders = my_orders(&client, customer_id).await;
    let row = orders
        .iter()
        .find(|row| row["id"].as_i64() == Some(order_id))
        .expect("order missing from listing");
    assert_eq!(row["items_count"], 2);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_order_rejects_out_of_range_status() {
    let client = TestClient::sign_in().await;

    let (status, _) = client
        .post(
            "/order/create",
            &json!({
                "order_status": 9,
                "items": [{ "product_id": 1, "quantity": 1, "price": 10 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_wishlist_container_is_reused() {
    let client = TestClient::sign_in().await;

    let (status, first) = client
        .post("/admin/wishlist/create", &json!({ "product_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let (_, second) = client
        .post("/admin/wishlist/create", &json!({ "product_id": 1 }))
        .await;
    assert_eq!(created_id(&first), created_id(&second));

    let (_, list) = client.get("/admin/wishlist").await;
    assert_eq!(list["count"], 1);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_cart_item_lifecycle() {
    let client = TestClient::sign_in().await;

    let (status, body) = client
        .post("/cart/create", &json!({ "product_id": 1, "quantity": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let cart_id = created_id(&body);

    let (status, list) = client.get("/cart/list?limit=100").await;
    assert_eq!(status, StatusCode::OK);
    let item_id = list["data"]
        .as_array()
        .expect("data is not a list")
        .iter()
        .find(|item| item["cart_id"].as_i64() == Some(cart_id))
        .and_then(|item| item["id"].as_i64())
        .expect("cart item missing");

    let (status, _) = client
        .patch(&format!("/cart/item/{item_id}/update"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.delete(&format!("/cart/item/delete/{item_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.delete(&format!("/cart/item/delete/{item_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

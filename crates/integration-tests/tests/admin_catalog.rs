//! Integration tests for categories, params and products.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`bozor-cli migrate`)
//! - The admin server running (`cargo run -p bozor-admin`)
//! - `BOZOR_TEST_LOGIN` / `BOZOR_TEST_PASSWORD` for an existing user

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use bozor_integration_tests::{TestClient, created_id, read, unique};

// 1x1 transparent PNG.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

async fn create_category(client: &TestClient, name: &Value) -> i64 {
    let (status, body) = client
        .post("/admin/category/create", &json!({ "name": name, "parent_id": null }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    created_id(&body)
}

async fn create_product(client: &TestClient, category_id: i64) -> i64 {
    let data = json!({
        "name": { "uz": unique("Ko'ylak"), "en": "Shirt" },
        "description": { "uz": "Paxta", "en": "Cotton" },
        "price": 1000,
        "stock_quantity": 5,
        "category_id": category_id,
    });
    let form = Form::new().text("data", data.to_string()).part(
        "images",
        Part::bytes(PIXEL_PNG.to_vec())
            .file_name("pixel.png")
            .mime_str("image/png")
            .expect("valid mime"),
    );

    let (status, body) = read(
        client
            .request(reqwest::Method::POST, "/admin/product/create")
            .multipart(form)
            .send()
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    created_id(&body)
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_create_category_then_get_by_id() {
    let client = TestClient::sign_in().await;
    let id = create_category(&client, &json!({ "uz": "Kiyim" })).await;

    let (status, body) = read(
        client
            .request(reqwest::Method::GET, &format!("/admin/category/{id}"))
            .header(reqwest::header::ACCEPT_LANGUAGE, "uz")
            .send()
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name_localized"], "Kiyim");
    assert_eq!(body["data"]["name"]["uz"], "Kiyim");
    assert_eq!(body["data"]["params"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_partial_update_keeps_other_locales() {
    let client = TestClient::sign_in().await;
    let id = create_category(&client, &json!({ "uz": "Poyabzal", "en": "Shoes" })).await;

    let (status, _) = client
        .patch(&format!("/admin/category/{id}"), &json!({ "name": { "ru": "Обувь" } }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = client.get(&format!("/admin/category/{id}")).await;
    assert_eq!(body["data"]["name"]["uz"], "Poyabzal");
    assert_eq!(body["data"]["name"]["ru"], "Обувь");
    assert_eq!(body["data"]["name"]["en"], "Shoes");
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_deleted_category_disappears() {
    let client = TestClient::sign_in().await;
    let id = create_category(&client, &json!({ "uz": unique("vaqtinchalik") })).await;

    let (status, _) = client.delete(&format!("/admin/category/delete/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.get(&format!("/admin/category/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = client.get("/admin/category/list").await;
    let listed = list["data"]["results"]
        .as_array()
        .expect("results is not a list")
        .iter()
        .any(|row| row["id"].as_i64() == Some(id));
    assert!(!listed);

    let (status, _) = client.delete(&format!("/admin/category/delete/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_param_with_values_and_category() {
    let client = TestClient::sign_in().await;
    let category_id = create_category(&client, &json!({ "uz": unique("Telefon") })).await;

    let (status, body) = client
        .post(
            "/admin/param/create",
            &json!({ "name": { "uz": "Rang" }, "type": "select", "category_id": [category_id] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let param_id = created_id(&body);

    let (status, body) = client
        .post(
            "/admin/param-value/create",
            &json!({ "name": { "uz": "Qizil" }, "param_id": param_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, values) = client.get(&format!("/admin/param-value/list/{param_id}")).await;
    assert_eq!(values["data"]["results"].as_array().map(Vec::len), Some(1));

    let (_, category) = client.get(&format!("/admin/category/{category_id}")).await;
    let params = category["data"]["params"].as_array().expect("params is not a list");
    assert!(params.iter().any(|param| param["id"].as_i64() == Some(param_id)));
}

#[tokio::test]
#[ignore = "Requires running bozor-admin server"]
async fn test_price_only_update_keeps_other_fields() {
    let client = TestClient::sign_in().await;
    let category_id = create_category(&client, &json!({ "uz": unique("Kiyim") })).await;
    let id = create_product(&client, category_id).await;

    let (_, before) = client.get(&format!("/admin/product/{id}")).await;

    let form = Form::new().text("data", json!({ "price": 1500 }).to_string());
    let (status, body) = read(
        client
            .request(reqwest::Method::PATCH, &format!("/admin/product/update/{id}"))
            .multipart(form)
            .send()
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, after) = client.get(&format!("/admin/product/{id}")).await;
    assert_eq!(after["data"]["price"].as_f64(), Some(1500.0));
    assert_eq!(after["data"]["name"], before["data"]["name"]);
    assert_eq!(after["data"]["description"], before["data"]["description"]);
    assert_eq!(after["data"]["images"], before["data"]["images"]);
    assert_eq!(after["data"]["images"].as_array().map(Vec::len), Some(1));
}

//! Integration tests for Bozor.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate the database and create a user to sign in with
//! cargo run -p bozor-cli -- migrate
//! cargo run -p bozor-cli -- user create --login admin --password '...' \
//!     --first-name Admin --last-name Bozor
//!
//! # Start the server, then run the ignored tests
//! cargo run -p bozor-admin
//! BOZOR_TEST_LOGIN=admin BOZOR_TEST_PASSWORD='...' \
//!     cargo test -p bozor-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `BOZOR_BASE_URL` - Server address (default: `http://localhost:8080`)
//! - `BOZOR_TEST_LOGIN` / `BOZOR_TEST_PASSWORD` - Credentials used for sign-in

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

/// Base URL of the running server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BOZOR_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// An HTTP client signed in as the test user.
pub struct TestClient {
    client: Client,
    token: String,
    api: String,
}

impl TestClient {
    /// Sign in with `BOZOR_TEST_LOGIN` / `BOZOR_TEST_PASSWORD`.
    pub async fn sign_in() -> Self {
        let login = std::env::var("BOZOR_TEST_LOGIN").expect("BOZOR_TEST_LOGIN must be set");
        let password =
            std::env::var("BOZOR_TEST_PASSWORD").expect("BOZOR_TEST_PASSWORD must be set");

        let client = Client::new();
        let api = format!("{}/api/v1", base_url());

        let resp = client
            .post(format!("{api}/admin/auth/sign-in"))
            .json(&serde_json::json!({ "login": login, "password": password }))
            .send()
            .await
            .expect("Failed to reach server");
        assert_eq!(resp.status(), StatusCode::OK, "sign-in failed");

        let body: Value = resp.json().await.expect("sign-in body is not JSON");
        let token = body["token"].as_str().expect("token missing").to_owned();

        Self { client, token, api }
    }

    /// Absolute URL of an API path such as `/admin/category/list`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api)
    }

    /// Start an authorized request.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// `GET` a path and return status and JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        read(self.request(reqwest::Method::GET, path).send().await).await
    }

    /// `POST` a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        read(self.request(reqwest::Method::POST, path).json(body).send().await).await
    }

    /// `PATCH` a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        read(self.request(reqwest::Method::PATCH, path).json(body).send().await).await
    }

    /// `DELETE` a path.
    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        read(self.request(reqwest::Method::DELETE, path).send().await).await
    }
}

/// Status and JSON body of a response; non-JSON bodies read as `null`.
pub async fn read(resp: reqwest::Result<Response>) -> (StatusCode, Value) {
    let resp = resp.expect("Failed to reach server");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// The `id` of a create response.
#[must_use]
pub fn created_id(body: &Value) -> i64 {
    body["id"].as_i64().expect("response has no numeric id")
}

/// A name unique to this test run.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

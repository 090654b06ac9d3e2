//! Success envelopes for API responses.
//!
//! Every success body carries `"message": "ok!"` plus some of `data`,
//! `count` and `id`. Listings the admin UI renders as tables wrap their
//! rows as `data: {results, count}`; the others put `count` next to `data`.

use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::models::Page;

const OK: &str = "ok!";

/// Response body of every successful request.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
}

/// Rows and total count nested inside `data`.
#[derive(Debug, Serialize)]
pub struct Results<T: Serialize> {
    results: Vec<T>,
    count: i64,
}

/// JSON response with a status code.
pub type ApiResponse<T> = (StatusCode, Json<Envelope<T>>);

/// `{"message": "ok!"}`.
#[must_use]
pub fn ok() -> ApiResponse<()> {
    respond(StatusCode::OK, None, None, None)
}

/// `{"message": "ok!", "id": id}` with the given status.
#[must_use]
pub fn created(status: StatusCode, id: impl Into<i64>) -> ApiResponse<()> {
    respond(status, None, None, Some(id.into()))
}

/// `{"message": "ok!", "data": data}`.
#[must_use]
pub fn data<T: Serialize>(data: T) -> ApiResponse<T> {
    respond(StatusCode::OK, Some(data), None, None)
}

/// `{"message": "ok!", "data": [...], "count": n}`.
#[must_use]
pub fn page<T: Serialize>(page: Page<T>) -> ApiResponse<Vec<T>> {
    respond(StatusCode::OK, Some(page.items), Some(page.count), None)
}

/// `{"message": "ok!", "data": {"results": [...], "count": n}}`.
#[must_use]
pub fn results<T: Serialize>(page: Page<T>) -> ApiResponse<Results<T>> {
    let nested = Results {
        results: page.items,
        count: page.count,
    };
    respond(StatusCode::OK, Some(nested), None, None)
}

const fn respond<T: Serialize>(
    status: StatusCode,
    data: Option<T>,
    count: Option<i64>,
    id: Option<i64>,
) -> ApiResponse<T> {
    (
        status,
        Json(Envelope {
            message: OK,
            data,
            count,
            id,
        }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body<T: Serialize>(response: ApiResponse<T>) -> serde_json::Value {
        serde_json::to_value(&response.1.0).unwrap()
    }

    #[test]
    fn test_ok_has_only_message() {
        assert_eq!(body(ok()), json!({ "message": "ok!" }));
    }

    #[test]
    fn test_created_carries_id_and_status() {
        let response = created(StatusCode::CREATED, 42_i64);
        assert_eq!(response.0, StatusCode::CREATED);
        assert_eq!(body(response), json!({ "message": "ok!", "id": 42 }));
    }

    #[test]
    fn test_page_puts_count_beside_data() {
        let response = page(Page::new(vec!["a", "b"], 7));
        assert_eq!(
            body(response),
            json!({ "message": "ok!", "data": ["a", "b"], "count": 7 })
        );
    }

    #[test]
    fn test_results_nests_rows_and_count() {
        let response = results(Page::new(vec![1, 2, 3], 10));
        assert_eq!(
            body(response),
            json!({ "message": "ok!", "data": { "results": [1, 2, 3], "count": 10 } })
        );
    }
}

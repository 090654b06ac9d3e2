//! Request extractors shared by the API handlers.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use bozor_core::{FilterError, Language, ListFilter, SortOrder, parse_id, parse_limit, parse_offset};

use crate::error::AppError;
use crate::services::UploadedFile;

/// Message for a path id that is not a number.
pub const INVALID_ID: &str = "ID must be number!";

/// JSON body whose rejection renders as an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Request language from `Accept-Language`, defaulting to Uzbek.
#[derive(Debug, Clone, Copy)]
pub struct Lang(pub Language);

impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_language(parts)))
    }
}

/// Listing parameters parsed from the query string.
#[derive(Debug, Clone)]
pub struct Listing(pub ListFilter);

impl<S: Send + Sync> FromRequestParts<S> for Listing {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        Ok(Self(list_filter(&params, request_language(parts))?))
    }
}

/// A numeric `{id}` path segment converted into a typed id.
#[derive(Debug, Clone, Copy)]
pub struct PathId<T>(pub T);

impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: From<i64>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(INVALID_ID))?;

        raw.trim()
            .parse::<i64>()
            .map(|id| Self(T::from(id)))
            .map_err(|_| AppError::bad_request(INVALID_ID))
    }
}

/// A multipart form with a JSON `data` part and uploaded files.
#[derive(Debug)]
pub struct MultipartForm<T> {
    /// Parsed `data` part, if sent.
    pub data: Option<T>,
    /// Non-empty file parts named like the requested file field.
    pub files: Vec<UploadedFile>,
}

impl<T: DeserializeOwned> MultipartForm<T> {
    /// Read every part of `multipart`, keeping files named `file_field`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed body or a `data` part
    /// that is not valid JSON for `T`.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, AppError> {
        let mut data = None;
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "data" {
                let text = field.text().await?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| AppError::bad_request(format!("invalid data: {e}")))?;
                data = Some(parsed);
            } else if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                files.push(UploadedFile { file_name, bytes });
            }
        }

        Ok(Self { data, files })
    }

    /// The `data` part, which must be present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if no `data` part was sent.
    pub fn require_data(self) -> Result<(T, Vec<UploadedFile>), AppError> {
        match self.data {
            Some(data) => Ok((data, self.files)),
            None => Err(AppError::bad_request("data is required")),
        }
    }
}

fn request_language(parts: &Parts) -> Language {
    Language::from_header(
        parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    )
}

/// Build a [`ListFilter`] from raw query parameters. Blank values count as
/// absent.
fn list_filter(params: &HashMap<String, String>, language: Language) -> Result<ListFilter, FilterError> {
    let get = |key: &str| {
        params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    };

    Ok(ListFilter {
        limit: parse_limit(get("limit"))?,
        offset: parse_offset(get("offset"))?,
        order: get("order").and_then(SortOrder::parse),
        search: get("search").map(str::to_owned),
        language,
        category_id: parse_id("category_id", get("category_id"))?,
        role: parse_id("role", get("role"))?,
        customer_id: parse_id("customer_id", get("customer_id"))?,
        param_id: parse_id("param_id", get("param_id"))?,
        region_id: parse_id("region_id", get("region_id"))?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{RoleId, SortDirection};

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_list_filter_parses_all_fields() {
        let filter = list_filter(
            &params(&[
                ("limit", "10"),
                ("offset", "20"),
                ("order", "name desc"),
                ("search", "shoe"),
                ("role", "3"),
            ]),
            Language::Ru,
        )
        .unwrap();

        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.offset, Some(20));
        assert_eq!(filter.order.as_ref().unwrap().direction, SortDirection::Desc);
        assert_eq!(filter.search.as_deref(), Some("shoe"));
        assert_eq!(filter.role, Some(RoleId::new(3)));
        assert_eq!(filter.language, Language::Ru);
    }

    #[test]
    fn test_list_filter_rejects_bad_numbers() {
        assert_eq!(
            list_filter(&params(&[("limit", "ten")]), Language::Uz).unwrap_err(),
            FilterError::InvalidLimit
        );
        assert_eq!(
            list_filter(&params(&[("offset", "-1")]), Language::Uz).unwrap_err(),
            FilterError::InvalidOffset
        );
        assert_eq!(
            list_filter(&params(&[("category_id", "x")]), Language::Uz).unwrap_err(),
            FilterError::InvalidNumber("category_id")
        );
    }

    #[test]
    fn test_list_filter_treats_blank_as_absent() {
        let filter = list_filter(&params(&[("limit", ""), ("search", "  ")]), Language::Uz).unwrap();
        assert_eq!(filter, ListFilter::default());
    }
}

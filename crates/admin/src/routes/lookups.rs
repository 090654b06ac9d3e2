//! Role, region and district lookup lists.

use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use super::extract::{Lang, Listing};
use super::response::{self, ApiResponse, Results};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Page;
use crate::models::lookup::{District, Region, Role};
use crate::services::LookupService;
use crate::state::AppState;

/// Build the lookup router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/role/list", get(roles))
        .route("/admin/region/list", get(regions))
        .route("/admin/district/list", get(districts))
}

/// All roles.
#[instrument(skip_all)]
pub async fn roles(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Role>>> {
    let roles = LookupService::new(state.pool(), state.lookups()).roles().await?;
    Ok(response::page(counted(&roles)))
}

/// All regions with names in the request language.
#[instrument(skip_all)]
pub async fn regions(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Lang(language): Lang,
) -> Result<ApiResponse<Results<Region>>> {
    let regions = LookupService::new(state.pool(), state.lookups())
        .regions(language)
        .await?;
    Ok(response::results(counted(&regions)))
}

/// Districts, optionally of one region (`?region_id=`).
#[instrument(skip_all)]
pub async fn districts(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Listing(filter): Listing,
) -> Result<ApiResponse<Results<District>>> {
    let districts = LookupService::new(state.pool(), state.lookups())
        .districts(filter.language, filter.region_id)
        .await?;
    Ok(response::results(counted(&districts)))
}

fn counted<T: Clone>(rows: &Arc<Vec<T>>) -> Page<T> {
    let count = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    Page::new(rows.as_ref().clone(), count)
}

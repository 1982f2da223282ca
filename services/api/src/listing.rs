//! Listing proxy: forwards pagination to the remote listing endpoint

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;

/// Query parameters for media listing
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    /// Page number (1-based)
    pub page: Option<String>,
    /// Number of items per page
    pub limit: Option<String>,
}

fn parse_param(name: &str, raw: Option<&str>, default: u32) -> ApiResult<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {} parameter", name))),
    }
}

/// `GET /media?page=&limit=`
///
/// The remote body is returned unchanged; pages past the end are not clamped.
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Json<Value>> {
    let api_key = state.config.api_key().map_err(ApiError::listing)?;

    let page = parse_param("page", query.page.as_deref(), DEFAULT_PAGE)?;
    let limit = parse_param("limit", query.limit.as_deref(), DEFAULT_LIMIT)?;

    info!("Fetching media listing: page={} limit={}", page, limit);
    let listing = state
        .remote
        .list_media(api_key, page, limit)
        .await
        .map_err(ApiError::listing)?;

    Ok(Json(listing))
}

use std::str::FromStr;

use axum::{
    extract::{RawQuery, State},
    Extension, Json,
};
use serde::Serialize;
use stonemart_core::Listing;
use stonemart_search::{
    distance_km, extra_param, parse_query, FacetSelection, GeoPoint, OptionCounts, SortKey,
};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ListingItem {
    #[serde(flatten)]
    listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ListingsPage {
    total: usize,
    limit: usize,
    offset: usize,
    listings: Vec<ListingItem>,
    selection: FacetSelection,
    /// Canonical query string for `selection`.
    query: String,
    sort: Option<SortKey>,
    option_counts: OptionCounts,
}

/// Parses an optional numeric host parameter. Blank counts as absent.
fn numeric_param<T: FromStr>(params: &[(String, String)], name: &str) -> Result<Option<T>, String> {
    match extra_param(params, name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} must be a whole number, got \"{raw}\"")),
    }
}

pub(super) async fn list_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ApiResponse<ListingsPage>>, ApiError> {
    let bad_request = |message: String| ApiError::new(req_id.0.clone(), "bad_request", message);

    let params = parse_query(raw.as_deref().unwrap_or_default());
    let limit = normalize_limit(numeric_param::<i64>(&params, "limit").map_err(bad_request)?);
    let offset = numeric_param::<usize>(&params, "offset")
        .map_err(bad_request)?
        .unwrap_or(0);
    let near = match extra_param(&params, "near").map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(GeoPoint::parse(raw).ok_or_else(|| {
            bad_request(format!("near must be \"lat,lng\", got \"{raw}\""))
        })?),
    };

    let selection = state
        .codec
        .hydrate(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let sort = extra_param(&params, "sort").and_then(SortKey::parse);
    let outcome = state.engine.search(&selection, sort);

    let listings = outcome
        .listings(&state.engine)
        .skip(offset)
        .take(limit)
        .map(|listing| ListingItem {
            distance_km: near.and_then(|origin| distance_km(origin, listing)),
            listing: listing.clone(),
        })
        .collect();

    tracing::debug!(
        request_id = %req_id.0,
        total = outcome.total(),
        limit,
        offset,
        "listings search"
    );

    Ok(Json(ApiResponse {
        data: ListingsPage {
            total: outcome.total(),
            limit,
            offset,
            listings,
            query: state.codec.serialize(&selection),
            selection,
            sort,
            option_counts: outcome.option_counts,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

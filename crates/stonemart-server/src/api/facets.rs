use axum::{extract::State, Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use stonemart_search::{format_currency, FacetSelection, OptionCounts};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct PriceRange {
    min: Decimal,
    max: Decimal,
    min_label: String,
    max_label: String,
}

#[derive(Debug, Serialize)]
pub(super) struct FacetsData {
    count_mode: String,
    option_counts: OptionCounts,
    price_range: Option<PriceRange>,
}

/// Option counts over the full catalog, for rendering an unfiltered panel.
pub(super) async fn get_facets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<FacetsData>> {
    let engine = &state.engine;
    let price_range = engine.price_range().map(|(min, max)| PriceRange {
        min,
        max,
        min_label: format_currency(min),
        max_label: format_currency(max),
    });

    Json(ApiResponse {
        data: FacetsData {
            count_mode: engine.count_mode().to_string(),
            option_counts: engine.option_counts(&FacetSelection::new()).into_owned(),
            price_range,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{get_json, test_app};

    #[tokio::test]
    async fn facets_count_every_candidate_option() {
        let (status, json) = get_json(test_app(), "/api/v1/facets").await;
        assert_eq!(status, StatusCode::OK);
        let counts = &json["data"]["option_counts"];
        assert_eq!(counts["stoneType"]["Granite"], 2);
        assert_eq!(counts["stoneType"]["Marble"], 1);
        assert_eq!(counts["category"]["Headstones"], 2);
        assert_eq!(counts["category"]["Urns"], 0);
        assert_eq!(counts["location"]["Gauteng"], 2);
        assert_eq!(json["data"]["count_mode"], "independent");
    }

    #[tokio::test]
    async fn facets_report_formatted_price_range() {
        let (_, json) = get_json(test_app(), "/api/v1/facets").await;
        assert_eq!(json["data"]["price_range"]["min_label"], "R 4,000");
        assert_eq!(json["data"]["price_range"]["max_label"], "R 12,000");
    }
}

use axum::{extract::State, Extension, Json};
use stonemart_search::LocationNode;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

/// The province / city / town tree with counts materialized when the engine
/// was built.
pub(super) async fn get_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<LocationNode>>> {
    Json(ApiResponse {
        data: state.engine.location_tree().to_vec(),
        meta: ResponseMeta::new(req_id.0),
    })
}

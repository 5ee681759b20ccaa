use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dermloc_core::Coordinate;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_locator_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeocodeData {
    pub query: String,
    pub location: Coordinate,
}

pub(super) async fn geocode_address(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<ApiResponse<GeocodeData>>, ApiError> {
    let q = query.q.unwrap_or_default();
    let location = state
        .geocoder
        .geocode(&q)
        .await
        .map_err(|e| map_locator_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: GeocodeData {
            query: q.trim().to_string(),
            location,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

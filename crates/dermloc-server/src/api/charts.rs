use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dermloc_charts::{load_dashboard, Dashboard, ForecastModel, YearRange};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct DashboardQuery {
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub model: Option<String>,
}

/// All dashboard panels. A failing panel is reported inside the payload
/// rather than failing the request.
pub(super) async fn dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let chosen = query
        .model
        .as_deref()
        .map(str::parse::<ForecastModel>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let range = YearRange::sanitize(query.start, query.end);
    let data = load_dashboard(&state.charts, range, &ForecastModel::order_from(chosen)).await;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

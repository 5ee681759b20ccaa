//! Per-user search sessions: location, search and ownership re-filter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use dermloc_core::{Category, Coordinate, OwnershipFilter};
use dermloc_locator::{
    acquire_location, search_shared, FixedLocation, RenderedView, SearchSession, SharedSession,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_locator_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Largest accepted search radius.
pub(super) const MAX_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Serialize)]
pub(super) struct SessionCreated {
    pub session_id: Uuid,
    pub location: Coordinate,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionLocation {
    pub session_id: Uuid,
    pub location: Coordinate,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationBody {
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    pub radius_km: f64,
    pub category: String,
    pub ownership: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultsQuery {
    pub ownership: Option<String>,
}

async fn find_session(state: &AppState, req_id: &str, id: Uuid) -> Result<SharedSession, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::new(req_id, "not_found", format!("session {id} not found")))
}

fn parse_filter(req_id: &str, raw: Option<&str>) -> Result<OwnershipFilter, ApiError> {
    raw.map_or(Ok(OwnershipFilter::All), str::parse::<OwnershipFilter>)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))
}

fn validate_radius(req_id: &str, radius_km: f64) -> Result<f64, ApiError> {
    if radius_km.is_finite() && radius_km > 0.0 && radius_km <= MAX_RADIUS_KM {
        Ok(radius_km)
    } else {
        Err(ApiError::new(
            req_id,
            "validation_error",
            format!("radius_km must be greater than 0 and at most {MAX_RADIUS_KM}"),
        ))
    }
}

pub(super) async fn create_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<SessionCreated>>), ApiError> {
    let session = SearchSession::shared(state.max_results);
    let location = session.lock().await.location();

    let Ok(session_id) = state.sessions.insert(session).await else {
        tracing::warn!("session capacity reached");
        return Err(ApiError::new(
            req_id.0,
            "capacity_exceeded",
            "too many open sessions; try again later",
        ));
    };
    tracing::debug!(%session_id, "session created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SessionCreated {
                session_id,
                location,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.remove(session_id).await {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("session {session_id} not found"),
        ));
    }
    tracing::debug!(%session_id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn set_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<LocationBody>,
) -> Result<Json<ApiResponse<SessionLocation>>, ApiError> {
    let session = find_session(&state, &req_id.0, session_id).await?;

    let provider = FixedLocation::new(Coordinate::new(body.lat, body.lon), body.accuracy_m);
    let fix = acquire_location(&provider, state.geolocation_timeout)
        .await
        .map_err(|e| map_locator_error(req_id.0.clone(), &e))?;

    session
        .lock()
        .await
        .set_location(fix.coordinate, fix.accuracy_m);

    Ok(Json(ApiResponse {
        data: SessionLocation {
            session_id,
            location: fix.coordinate,
            accuracy_m: fix.accuracy_m,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn run_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<RenderedView>>, ApiError> {
    let radius_km = validate_radius(&req_id.0, body.radius_km)?;
    let category: Category = body
        .category
        .parse()
        .map_err(|e: dermloc_core::CoreError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;
    let filter = body
        .ownership
        .as_deref()
        .map(|raw| parse_filter(&req_id.0, Some(raw)))
        .transpose()?;

    let session = find_session(&state, &req_id.0, session_id).await?;
    if let Some(filter) = filter {
        session.lock().await.set_filter(filter);
    }

    let view = search_shared(&session, state.gateway.as_ref(), radius_km, category)
        .await
        .map_err(|e| map_locator_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn filtered_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ApiResponse<RenderedView>>, ApiError> {
    let session = find_session(&state, &req_id.0, session_id).await?;

    let view = {
        let mut guard = session.lock().await;
        let filter = match query.ownership.as_deref() {
            Some(raw) => parse_filter(&req_id.0, Some(raw))?,
            None => guard.filter(),
        };
        guard.set_filter(filter).cloned()
    };

    let Some(data) = view else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "no search results yet for this session",
        ));
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

mod charts;
mod geocode;
mod sessions;
mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dermloc_charts::ChartsClient;
use dermloc_core::AppConfig;
use dermloc_locator::{Geocoder, LocatorError, OverpassGateway};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

pub use store::{SessionStore, SESSION_IDLE_TTL};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<OverpassGateway>,
    pub geocoder: Arc<Geocoder>,
    pub charts: Arc<ChartsClient>,
    pub sessions: SessionStore,
    pub max_results: usize,
    pub geolocation_timeout: Duration,
}

impl AppState {
    /// Builds the upstream clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured upstream URL is invalid.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let gateway = OverpassGateway::new(
            &config.overpass_endpoints,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        let geocoder = Geocoder::new(
            &config.nominatim_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        let charts = ChartsClient::new(
            &config.charts_api_base,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(Self::new(
            gateway,
            geocoder,
            charts,
            config.max_results,
            Duration::from_secs(config.geolocation_timeout_secs),
        ))
    }

    #[must_use]
    pub fn new(
        gateway: OverpassGateway,
        geocoder: Geocoder,
        charts: ChartsClient,
        max_results: usize,
        geolocation_timeout: Duration,
    ) -> Self {
        Self {
            gateway: Arc::new(gateway),
            geocoder: Arc::new(geocoder),
            charts: Arc::new(charts),
            sessions: SessionStore::default(),
            max_results,
            geolocation_timeout,
        }
    }

    /// Replaces the session store, e.g. to change capacity or idle TTL.
    #[cfg(test)]
    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    geodata_endpoints: usize,
    sessions: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "geocode_not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "superseded" => StatusCode::CONFLICT,
            "location_unavailable" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "data_source_unavailable" | "capacity_exceeded" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a pipeline error to its stable code and the status text the page
/// shows in place of results.
pub(super) fn map_locator_error(request_id: String, error: &LocatorError) -> ApiError {
    match error {
        LocatorError::Superseded { .. } => {
            tracing::debug!(error = %error, "request superseded");
            ApiError::new(request_id, error.code(), error.to_string())
        }
        LocatorError::GeocodeNotFound { .. } | LocatorError::LocationUnavailable(_) => {
            ApiError::new(request_id, error.code(), error.user_message())
        }
        _ => {
            tracing::error!(error = %error, "locator request failed");
            ApiError::new(request_id, error.code(), error.user_message())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Routes that reach the public geodata and geocoding services or
/// allocate server-side state.
fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions", post(sessions::create_session))
        .route(
            "/api/v1/sessions/{session_id}/search",
            post(sessions::run_search),
        )
        .route("/api/v1/geocode", get(geocode::geocode_address))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let local_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/sessions/{session_id}",
            delete(sessions::delete_session),
        )
        .route(
            "/api/v1/sessions/{session_id}/location",
            put(sessions::set_location),
        )
        .route(
            "/api/v1/sessions/{session_id}/results",
            get(sessions::filtered_results),
        )
        .route("/api/v1/charts", get(charts::dashboard));

    Router::new()
        .merge(local_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let sessions = state.sessions.count().await;
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            geodata_endpoints: state.gateway.endpoints().len(),
            sessions,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(60, Duration::from_secs(60))
}


#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_tests;

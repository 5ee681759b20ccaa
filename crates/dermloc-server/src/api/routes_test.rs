use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dermloc_charts::ChartsClient;
use dermloc_locator::{Geocoder, OverpassGateway};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{build_app, AppState, SessionStore};
use crate::middleware::RateLimitState;

fn state_for(server: &MockServer) -> AppState {
    let uri = server.uri();
    AppState::new(
        OverpassGateway::new(&[format!("{uri}/api/interpreter")], 5, "dermloc-test/0.1")
            .expect("gateway"),
        Geocoder::new(&format!("{uri}/search"), 5, "dermloc-test/0.1").expect("geocoder"),
        ChartsClient::new(&uri, 5, "dermloc-test/0.1").expect("charts client"),
        30,
        Duration::from_secs(1),
    )
}

fn app_for(server: &MockServer) -> Router {
    build_app(
        state_for(server),
        RateLimitState::new(100, Duration::from_secs(60)),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn with_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn create_session(app: &Router) -> String {
    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/sessions")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["session_id"]
        .as_str()
        .expect("session id")
        .to_string()
}

async fn mount_facilities(server: &MockServer, expected_calls: u64) {
    let elements = json!([
        {"type": "node", "id": 1, "lat": -23.551, "lon": -46.634, "tags": {
            "name": "Hospital Municipal", "amenity": "hospital", "operator": "Prefeitura"
        }},
        {"type": "node", "id": 2, "lat": -23.552, "lon": -46.635, "tags": {
            "name": "Clínica Bem Estar", "amenity": "clinic", "operator": "Unimed",
            "website": "javascript:alert(1)"
        }},
        {"type": "way", "id": 3, "center": {"lat": -23.553, "lon": -46.636}, "tags": {
            "name": "Posto de Saúde", "healthcare": "clinic", "operator:type": "public"
        }}
    ]);
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": elements})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let (status, json) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["geodata_endpoints"], 1);
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn search_then_refilter_without_requery() {
    let server = MockServer::start().await;
    mount_facilities(&server, 1).await;
    let app = app_for(&server);
    let id = create_session(&app).await;

    let (status, json) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/location"),
            &json!({"lat": -23.5505, "lon": -46.6333, "accuracy_m": 12.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["accuracy_m"], 12.0);

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{id}/search"),
            &json!({"radius_km": 5, "category": "all"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = json["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 3);
    assert_eq!(json["data"]["markers"].as_array().expect("markers").len(), 3);
    assert_eq!(json["data"]["user_marker"]["accuracy_radius_m"], 20.0);
    assert!(items.iter().all(|i| i["links"]["website"].is_null()));

    let (status, json) = send(
        &app,
        get(&format!("/api/v1/sessions/{id}/results?ownership=public")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = json["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["ownership"] == "public"));

    let (status, json) = send(
        &app,
        get(&format!("/api/v1/sessions/{id}/results?ownership=private")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["items"][0]["name"], "Clínica Bem Estar");
    assert_eq!(json["data"]["items"][0]["badge"], "Private");
}

#[tokio::test]
async fn results_before_any_search_are_not_found() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let id = create_session(&app).await;

    let (status, json) = send(&app, get(&format!("/api/v1/sessions/{id}/results"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{}/search", uuid::Uuid::new_v4()),
            &json!({"radius_km": 5, "category": "all"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let id = create_session(&app).await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/sessions/{id}"))
            .body(Body::empty())
            .expect("request")
    };
    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_search_input_is_rejected_without_querying() {
    let server = MockServer::start().await;
    mount_facilities(&server, 0).await;
    let app = app_for(&server);
    let id = create_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/search");

    for body in [
        json!({"radius_km": 0, "category": "all"}),
        json!({"radius_km": 500, "category": "all"}),
        json!({"radius_km": 5, "category": "pharmacy"}),
        json!({"radius_km": 5, "category": "all", "ownership": "mixed"}),
    ] {
        let (status, json) = send(&app, with_json("POST", &uri, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[tokio::test]
async fn dermatology_search_without_specialists_renders_scoped_status() {
    let server = MockServer::start().await;
    let elements = json!([
        {"type": "node", "id": 9, "lat": -23.551, "lon": -46.634, "tags": {
            "name": "Cardio Clínica", "healthcare:speciality": "cardiology"
        }}
    ]);
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": elements})))
        .mount(&server)
        .await;
    let app = app_for(&server);
    let id = create_session(&app).await;

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{id}/search"),
            &json!({"radius_km": 2, "category": "dermatology"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["items"].as_array().expect("items").is_empty());
    assert_eq!(
        json["data"]["status"],
        "No dermatology locations found within this radius. Try a larger radius or use \"All\"."
    );
}

#[tokio::test]
async fn unavailable_geodata_service_maps_to_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;
    let app = app_for(&server);
    let id = create_session(&app).await;

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{id}/search"),
            &json!({"radius_km": 5, "category": "hospital"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "data_source_unavailable");
    assert_eq!(
        json["error"]["message"],
        "Error searching for locations. Please try again shortly."
    );
}

#[tokio::test]
async fn geocode_returns_first_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Avenida Paulista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "-23.5613", "lon": "-46.6565", "display_name": "Avenida Paulista"}
        ])))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, json) = send(&app, get("/api/v1/geocode?q=Avenida%20Paulista")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["location"]["lat"], -23.5613);
    assert_eq!(json["data"]["location"]["lon"], -46.6565);
}

#[tokio::test]
async fn geocode_miss_is_not_found_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, json) = send(&app, get("/api/v1/geocode?q=nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "geocode_not_found");
    assert_eq!(json["error"]["message"], "Address not found.");
}

#[tokio::test]
async fn upstream_routes_are_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let app = build_app(
        state_for(&server),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (first, _) = send(&app, get("/api/v1/geocode?q=a")).await;
    assert_eq!(first, StatusCode::NOT_FOUND);
    let (second, json) = send(&app, get("/api/v1/geocode?q=a")).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");

    let (health, _) = send(&app, get("/api/v1/health")).await;
    assert_eq!(health, StatusCode::OK);
}

#[tokio::test]
async fn idle_sessions_are_evicted_when_store_is_full() {
    let server = MockServer::start().await;
    let state =
        state_for(&server).with_sessions(SessionStore::new(2, Duration::from_millis(100)));
    let app = build_app(state, RateLimitState::new(100, Duration::from_secs(60)));
    let create = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/sessions")
            .body(Body::empty())
            .expect("request")
    };

    let first = create_session(&app).await;
    create_session(&app).await;
    let (status, json) = send(&app, create()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "capacity_exceeded");

    tokio::time::sleep(Duration::from_millis(150)).await;

    let (status, _) = send(&app, create()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, json) = send(&app, get(&format!("/api/v1/sessions/{first}/results"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"]["message"]
        .as_str()
        .expect("message")
        .starts_with("session"));
}

#[tokio::test]
async fn session_creation_is_rate_limited() {
    let server = MockServer::start().await;
    let app = build_app(
        state_for(&server),
        RateLimitState::new(1, Duration::from_secs(60)),
    );
    create_session(&app).await;

    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/sessions")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}

#[tokio::test]
async fn charts_reject_unknown_model() {
    let server = MockServer::start().await;
    let app = app_for(&server);
    let (status, json) = send(&app, get("/api/v1/charts?model=lstm")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "unknown forecast model: lstm");
}

#[tokio::test]
async fn charts_report_failed_panels_inline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/incidencia/anual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ano": 2020, "casos": 10},
            {"ano": 2021, "casos": 12}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, json) = send(&app, get("/api/v1/charts?start=2020&end=2021")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["incidence"]["status"], "ready");
    assert_eq!(json["data"]["forecast"]["status"], "failed");
    assert_eq!(json["data"]["correlation"]["status"], "failed");
    assert!(json["data"]["forecast_model"].is_null());
}

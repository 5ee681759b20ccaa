//! Integration tests for `Geocoder` using wiremock HTTP mocks.

use dermloc_core::Coordinate;
use dermloc_locator::{Geocoder, LocatorError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_geocoder(server: &MockServer) -> Geocoder {
    Geocoder::new(&format!("{}/search", server.uri()), 5, "dermloc-test/0.1")
        .expect("geocoder construction should not fail")
}

#[tokio::test]
async fn geocode_returns_first_candidate() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {"lat": "-23.5613", "lon": "-46.6565", "display_name": "Avenida Paulista, São Paulo"},
        {"lat": "0", "lon": "0", "display_name": "ignored"}
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(query_param("accept-language", "pt-BR"))
        .and(query_param("countrycodes", "br"))
        .and(query_param("q", "Avenida Paulista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let coordinate = test_geocoder(&server)
        .geocode("  Avenida Paulista ")
        .await
        .expect("should geocode");
    assert_eq!(coordinate, Coordinate::new(-23.5613, -46.6565));
}

#[tokio::test]
async fn empty_candidate_list_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = test_geocoder(&server)
        .geocode("Rua Inexistente 999")
        .await
        .unwrap_err();
    assert!(
        matches!(err, LocatorError::GeocodeNotFound { ref query } if query == "Rua Inexistente 999"),
        "got: {err:?}"
    );
    assert_eq!(err.user_message(), "Address not found.");
}

#[tokio::test]
async fn blank_query_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_geocoder(&server).geocode("   ").await.unwrap_err();
    assert!(matches!(err, LocatorError::GeocodeNotFound { .. }));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_geocoder(&server).geocode("Recife").await.unwrap_err();
    assert!(
        matches!(err, LocatorError::UnexpectedStatus { status: 503, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn unparseable_coordinates_are_deserialize_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"lat": "south", "lon": "-46.6"}])),
        )
        .mount(&server)
        .await;

    let err = test_geocoder(&server).geocode("Recife").await.unwrap_err();
    assert!(matches!(err, LocatorError::Deserialize { .. }), "got: {err:?}");
}

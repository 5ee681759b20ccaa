//! Integration tests for `OverpassGateway` endpoint fallback using wiremock.

use dermloc_core::{Category, Coordinate};
use dermloc_locator::{build_query, LocatorError, OverpassGateway};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_body() -> serde_json::Value {
    serde_json::json!({
        "version": 0.6,
        "elements": [
            {
                "type": "node",
                "id": 1,
                "lat": -23.55,
                "lon": -46.63,
                "tags": {"amenity": "clinic", "name": "Clínica Pele Sã"}
            },
            {
                "type": "way",
                "id": 2,
                "center": {"lat": -23.56, "lon": -46.64},
                "tags": {"amenity": "hospital"}
            },
            {"type": "node", "lat": 1.0, "lon": 1.0}
        ]
    })
}

fn test_gateway(endpoints: &[String]) -> OverpassGateway {
    OverpassGateway::new(endpoints, 5, "dermloc-test/0.1")
        .expect("gateway construction should not fail")
}

fn query() -> dermloc_locator::QueryText {
    build_query(Coordinate::new(-23.55, -46.63), 2000.0, Category::Clinic)
}

#[tokio::test]
async fn first_endpoint_success_is_used() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/primary"))
        .and(body_string_contains("data="))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = test_gateway(&[
        format!("{}/primary", server.uri()),
        format!("{}/mirror", server.uri()),
    ]);
    let records = gateway.fetch_records(&query()).await.expect("should fetch");

    // The element without an id is skipped rather than failing the batch.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key(), "node/1");
    assert_eq!(records[1].key(), "way/2");
    assert!(records[1].center.is_some());
}

#[tokio::test]
async fn server_error_falls_back_to_next_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/primary"))
        .respond_with(ResponseTemplate::new(504))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = test_gateway(&[
        format!("{}/primary", server.uri()),
        format!("{}/mirror", server.uri()),
    ]);
    let records = gateway.fetch_records(&query()).await.expect("mirror should answer");
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn malformed_body_falls_back_to_next_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/primary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&server)
        .await;

    let gateway = test_gateway(&[
        format!("{}/primary", server.uri()),
        format!("{}/mirror", server.uri()),
    ]);
    let records = gateway.fetch_records(&query()).await.expect("mirror should answer");
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn all_endpoints_failing_is_data_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/primary"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let gateway = test_gateway(&[
        format!("{}/primary", server.uri()),
        format!("{}/mirror", server.uri()),
    ]);
    let err = gateway.fetch_records(&query()).await.unwrap_err();

    match err {
        LocatorError::DataSourceUnavailable {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert!(
                matches!(*last_error, LocatorError::UnexpectedStatus { status: 429, .. }),
                "last error should come from the final endpoint, got: {last_error:?}"
            );
        }
        other => panic!("expected DataSourceUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn missing_elements_array_is_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": 0.6})))
        .mount(&server)
        .await;

    let gateway = test_gateway(&[server.uri()]);
    let records = gateway.fetch_records(&query()).await.expect("should fetch");
    assert!(records.is_empty());
}

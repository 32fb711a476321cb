//! Integration tests for `GeoQueryClient` using wiremock HTTP mocks.

use nearserve_client::{ClientError, GeoQueryClient};
use nearserve_core::{Coordinate, ScopeSpec, SearchQuery};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeoQueryClient {
    GeoQueryClient::with_base_url(base_url, 5, "nearserve-test/0.1")
        .expect("client construction should not fail")
}

fn delhi_query(scope: ScopeSpec) -> SearchQuery {
    let center = Coordinate::new(28.6139, 77.209).unwrap();
    SearchQuery::new(center, scope, Some("cooking".to_owned()))
}

fn provider(id: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Provider {id}"),
        "category": "cooking",
        "latitude": lat,
        "longitude": lng,
        "ratingAverage": 4.2,
        "ratingCount": 8
    })
}

#[tokio::test]
async fn radius_search_returns_parsed_providers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/services/nearby-providers"))
        .and(query_param("scope", "radius"))
        .and(query_param("lat", "28.6139"))
        .and(query_param("lng", "77.209"))
        .and(query_param("radiusKm", "10"))
        .and(query_param("category", "cooking"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "providers": [provider("a", 28.62, 77.21), provider("b", 28.60, 77.20)] }
        })))
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/api", server.uri()));
    let results = client
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "a");
    assert_eq!(results[0].rating_count, 8);
    assert!(results.iter().all(|r| r.distance_km.is_none()));
}

#[tokio::test]
async fn state_search_sends_state_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .and(query_param("scope", "state"))
        .and(query_param("state", "Delhi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "providers": [provider("s1", 28.5, 77.1)] }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client
        .search(&delhi_query(ScopeSpec::State {
            name: "Delhi".to_owned(),
        }))
        .await
        .expect("search should succeed");
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn empty_provider_list_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "providers": [] } })),
        )
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .expect("empty list is not an error");
    assert!(results.is_empty());
}

#[tokio::test]
async fn malformed_and_locationless_records_are_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "providers": [
                provider("good", 28.62, 77.21),
                { "name": "no id at all" },
                { "id": "nowhere", "name": "No location" }
            ] }
        })))
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .expect("bad records should be skipped, not fatal");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "good");
}

#[tokio::test]
async fn unsuccessful_envelope_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Invalid scope" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Server { ref message, .. } if message == "Invalid scope"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn http_500_surfaces_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "success": false, "message": "database offline" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Server { status: 500, ref message } if message == "database offline"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn transient_500_is_retried_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/services/nearby-providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "providers": [provider("after-retry", 28.62, 77.21)] }
        })))
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .retries(2, 0)
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .expect("second attempt should succeed");
    assert_eq!(results[0].id, "after-retry");
}

#[tokio::test]
async fn radius_10_then_25_is_monotonic_against_static_fixture() {
    // A static fixture served by a mock that honours radiusKm.
    let server = MockServer::start().await;
    let within_10 = vec![provider("n1", 28.62, 77.21), provider("n2", 28.60, 77.22)];
    let mut within_25 = within_10.clone();
    within_25.push(provider("m1", 28.75, 77.25));

    Mock::given(method("GET"))
        .and(query_param("radiusKm", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "data": { "providers": within_10 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("radiusKm", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "data": { "providers": within_25 }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let narrow = client
        .search(&delhi_query(ScopeSpec::Radius { km: 10 }))
        .await
        .unwrap();
    let wide = client
        .search(&delhi_query(ScopeSpec::Radius { km: 25 }))
        .await
        .unwrap();
    assert!(wide.len() >= narrow.len());
    assert!(narrow.iter().all(|n| wide.iter().any(|w| w.id == n.id)));
}

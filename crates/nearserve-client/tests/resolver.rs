//! Integration tests for `LocationResolver` fallbacks using wiremock.

use std::time::Duration;

use nearserve_client::{ClientError, LocationError, LocationResolver, StaticPosition};
use nearserve_core::{AppConfig, Coordinate, Environment, UNKNOWN_CITY, UNKNOWN_STATE};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(api_base_url: &str, geocoder_url: &str, geocode_timeout_secs: u64) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_owned(),
        api_base_url: api_base_url.to_owned(),
        geocoder_url: geocoder_url.to_owned(),
        user_agent: "nearserve-test/0.1".to_owned(),
        default_center: Coordinate::new(28.6139, 77.209).unwrap(),
        default_country: "India".to_owned(),
        country_codes: "in".to_owned(),
        geocode_timeout_secs,
        request_timeout_secs: 5,
        page_size: 50,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        auto_expand: false,
    }
}

fn point() -> Coordinate {
    Coordinate::new(19.076, 72.8777).unwrap()
}

#[tokio::test]
async fn backend_reverse_geocode_returns_place() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/reverse-geocode"))
        .and(query_param("lat", "19.076"))
        .and(query_param("lng", "72.8777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "city": "Mumbai", "state": "Maharashtra", "country": "India" }
        })))
        .mount(&backend)
        .await;

    let resolver = LocationResolver::new(&test_config(&backend.uri(), &backend.uri(), 5)).unwrap();
    let place = resolver.reverse_geocode(point()).await;
    assert_eq!(place.city, "Mumbai");
    assert_eq!(place.state, "Maharashtra");
    assert_eq!(place.country, "India");
}

#[tokio::test]
async fn falls_back_to_geocoder_when_backend_fails() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/reverse-geocode"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&backend)
        .await;

    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .and(query_param("lon", "72.8777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "town": "Thane", "state": "Maharashtra", "country": "India" }
        })))
        .mount(&geocoder)
        .await;

    let resolver = LocationResolver::new(&test_config(&backend.uri(), &geocoder.uri(), 5)).unwrap();
    let place = resolver.reverse_geocode(point()).await;
    assert_eq!(place.city, "Thane");
    assert_eq!(place.state, "Maharashtra");
}

#[tokio::test]
async fn reverse_geocode_timeout_yields_sentinel_place() {
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "city": "Late" } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&slow)
        .await;

    let resolver = LocationResolver::new(&test_config(&slow.uri(), &slow.uri(), 1)).unwrap();
    let place = resolver.reverse_geocode(point()).await;
    assert_eq!(place.city, UNKNOWN_CITY);
    assert_eq!(place.state, UNKNOWN_STATE);
    assert_eq!(place.country, "India");

    let ladder = nearserve_core::scope::ladder(&place);
    assert_eq!(ladder.len(), 6);
    assert_eq!(ladder[3].to_string(), "in Unknown City");
}

#[tokio::test]
async fn reverse_geocode_fallback_shares_one_deadline() {
    let slow_backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/reverse-geocode"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&slow_backend)
        .await;
    let slow_geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "address": { "city": "Late" } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&slow_geocoder)
        .await;

    let resolver =
        LocationResolver::new(&test_config(&slow_backend.uri(), &slow_geocoder.uri(), 1)).unwrap();
    let started = std::time::Instant::now();
    let err = resolver.try_reverse_geocode(point()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClientError::Timeout { .. }));
    assert!(elapsed < Duration::from_millis(1_800), "took {elapsed:?}");
}

#[tokio::test]
async fn forward_geocode_returns_first_hit() {
    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Hauz Khas"))
        .and(query_param("countrycodes", "in"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "28.5494", "lon": "77.2001", "display_name": "Hauz Khas, New Delhi" }
        ])))
        .mount(&geocoder)
        .await;

    let resolver = LocationResolver::new(&test_config(&geocoder.uri(), &geocoder.uri(), 5)).unwrap();
    let coordinate = resolver.forward_geocode("Hauz Khas").await.unwrap();
    assert!((coordinate.latitude() - 28.5494).abs() < 1e-9);
    assert!((coordinate.longitude() - 77.2001).abs() < 1e-9);
}

#[tokio::test]
async fn forward_geocode_without_hits_is_not_found() {
    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&geocoder)
        .await;

    let resolver = LocationResolver::new(&test_config(&geocoder.uri(), &geocoder.uri(), 5)).unwrap();
    let err = resolver.forward_geocode("Atlantis").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { ref query } if query == "Atlantis"));
}

#[tokio::test]
async fn blank_forward_query_is_not_found_without_a_request() {
    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&geocoder)
        .await;

    let resolver = LocationResolver::new(&test_config(&geocoder.uri(), &geocoder.uri(), 5)).unwrap();
    let err = resolver.forward_geocode("   ").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn denied_position_falls_back_to_default_center() {
    let resolver = LocationResolver::new(&test_config(
        "http://localhost:9",
        "http://localhost:9",
        5,
    ))
    .unwrap();

    let resolved = resolver.current_or_default(&StaticPosition::Denied).await;
    assert_eq!(resolved.coordinate, resolver.default_center());
    assert_eq!(resolved.fallback_reason, Some(LocationError::PermissionDenied));

    let known = point();
    let resolved = resolver
        .current_or_default(&StaticPosition::Known(known))
        .await;
    assert_eq!(resolved.coordinate, known);
    assert!(resolved.fallback_reason.is_none());
}

//! Integration tests for MeteoProvider using wiremock.
//!
//! These tests drive the real reqwest fetcher against a mock HTTP server.

use std::time::Duration;

use jaws_core::UnitSystem;
use jaws_weather::{FixedLocality, HttpFetcher, MeteoProvider, NominatimLocality, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body(days: usize) -> serde_json::Value {
    serde_json::json!({
        "latitude": 40.71,
        "longitude": -74.01,
        "current": {
            "time": "2024-02-27T15:00",
            "temperature_2m": 41.2,
            "relative_humidity_2m": 55,
            "is_day": 1,
            "weather_code": 95,
            "wind_speed_10m": 8.7,
            "wind_direction_10m": 310
        },
        "daily": {
            "time": vec!["2024-02-27"; days],
            "weather_code": vec![3; days],
            "temperature_2m_max": vec![45.0; days],
            "temperature_2m_min": vec![33.5; days]
        }
    })
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5), "jaws-test").unwrap()
}

fn provider(server: &MockServer) -> MeteoProvider<HttpFetcher, FixedLocality> {
    MeteoProvider::new(
        fetcher(),
        FixedLocality("New York".to_string()),
        format!("{}/v1/forecast", server.uri()),
    )
}

#[tokio::test]
async fn test_imperial_request_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40.710000"))
        .and(query_param("longitude", "-74.010000"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .and(query_param("wind_speed_unit", "mph"))
        .and(query_param("precipitation_unit", "inch"))
        .and(query_param("daily", "weather_code,temperature_2m_max,temperature_2m_min"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .by_location(40.71, -74.01, UnitSystem::Imperial)
        .await
        .unwrap();

    assert_eq!(result.locality, "New York");
    assert_eq!(result.condition, "Thunderstorms");
    assert_eq!(result.condition_code, 4);
    assert_eq!(result.wind_direction, 310);
    assert!(!result.is_metric());
    assert_eq!(result.forecasts.len(), 7);
    assert!(result.forecasts.iter().all(|d| d.condition_code == 30));
}

#[tokio::test]
async fn test_metric_request_has_no_unit_overrides() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .by_selector("lat=40.710000&lon=-74.010000", UnitSystem::Metric)
        .await;
    assert!(result.is_some());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("latitude=40.710000"));
    assert!(!query.contains("temperature_unit"));
    assert!(!query.contains("wind_speed_unit"));
    assert!(!query.contains("precipitation_unit"));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .by_location(1.0, 2.0, UnitSystem::Metric)
        .await;

    assert!(result.is_none());
}

#[tokio::test]
async fn test_missing_current_is_a_failure() {
    let mock_server = MockServer::start().await;

    let mut body = forecast_body(5);
    body.as_object_mut().unwrap().remove("current");

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_location(1.0, 2.0, UnitSystem::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::Malformed(_))));
}

#[tokio::test]
async fn test_empty_body_is_no_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .fetch_by_location(1.0, 2.0, UnitSystem::Metric)
        .await;

    assert!(matches!(result, Err(WeatherError::NoResponse(_))));
}

#[tokio::test]
async fn test_nominatim_locality_names_the_place() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "40.71"))
        .and(query_param("lon", "-74.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "New York, United States",
            "address": {
                "city": "New York",
                "state": "New York",
                "country": "United States"
            }
        })))
        .mount(&mock_server)
        .await;

    let locality = NominatimLocality::new(fetcher(), format!("{}/reverse", mock_server.uri()));
    let provider = MeteoProvider::new(
        fetcher(),
        locality,
        format!("{}/v1/forecast", mock_server.uri()),
    );

    let result = provider
        .by_location(40.71, -74.01, UnitSystem::Metric)
        .await
        .unwrap();

    // State equals the place name, so the country disambiguates
    assert_eq!(result.locality, "New York, United States");
}

#[tokio::test]
async fn test_failed_geocode_falls_back_to_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(5)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let locality = NominatimLocality::new(fetcher(), format!("{}/reverse", mock_server.uri()));
    let provider = MeteoProvider::new(
        fetcher(),
        locality,
        format!("{}/v1/forecast", mock_server.uri()),
    );

    let result = provider
        .by_location(40.71, -74.01, UnitSystem::Metric)
        .await
        .unwrap();

    assert_eq!(result.locality, "40.71, -74.01");
}

//! Open-Meteo weather requests.
//!
//! Failure policy: transport errors and a malformed top level (or `current`
//! block) fail the whole request, while a malformed forecast day only costs
//! that day (see [`crate::forecast`]).

use chrono::{Local, NaiveDate, Utc};
use jaws_core::{UnitSystem, WeatherConfig};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::condition::{icon_for, label_for};
use crate::forecast::parse_daily;
use crate::geocode::{LocalityResolver, NominatimLocality};
use crate::http::{Fetcher, HttpFetcher};
use crate::types::{DailyForecast, WeatherError, WeatherResult};

pub const CURRENT_ARGS: &str =
    "&current=temperature_2m,relative_humidity_2m,is_day,weather_code,wind_speed_10m,wind_direction_10m";
pub const DAILY_ARGS: &str = "&daily=weather_code,temperature_2m_max,temperature_2m_min";
pub const IMPERIAL_ARGS: &str =
    "&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch";

/// Selector for a coordinate pair, e.g. `lat=47.606200&lon=-122.332100`
pub fn coordinates_selector(lat: f64, lon: f64) -> String {
    format!("lat={:.6}&lon={:.6}", lat, lon)
}

/// Rewrites selector keys to the names the forecast API expects
fn selector_query(selector: &str) -> String {
    selector
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("lat", value)) => format!("latitude={}", value),
            Some(("lon", value)) => format!("longitude={}", value),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Full request URL for a selector
pub fn build_request_url(base_url: &str, selector: &str, units: UnitSystem) -> String {
    let unit_args = match units {
        UnitSystem::Metric => "",
        UnitSystem::Imperial => IMPERIAL_ARGS,
    };

    format!(
        "{}?{}{}{}{}",
        base_url,
        selector_query(selector),
        CURRENT_ARGS,
        DAILY_ARGS,
        unit_args
    )
}

/// Integer fields occasionally arrive as `270.0`; truncate like the widget always has
fn truncated_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value as i32)
}

#[derive(Debug, Deserialize)]
struct MeteoResponse {
    current: CurrentConditions,
    daily: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    #[serde(deserialize_with = "truncated_int")]
    relative_humidity_2m: i32,
    #[serde(deserialize_with = "truncated_int")]
    is_day: i32,
    #[serde(deserialize_with = "truncated_int")]
    weather_code: i32,
    wind_speed_10m: f64,
    #[serde(deserialize_with = "truncated_int")]
    wind_direction_10m: i32,
}

/// Parsed response before the locality is known
#[derive(Debug)]
struct ParsedConditions {
    current: CurrentConditions,
    forecasts: Vec<DailyForecast>,
}

fn parse_response(
    body: &str,
    units: UnitSystem,
    today: NaiveDate,
) -> Result<ParsedConditions, WeatherError> {
    let response: MeteoResponse = serde_json::from_str(body)?;
    let forecasts = parse_daily(&response.daily, units, today)?;

    Ok(ParsedConditions {
        current: response.current,
        forecasts,
    })
}

/// Open-Meteo weather provider
#[derive(Debug, Clone)]
pub struct MeteoProvider<F = HttpFetcher, L = NominatimLocality> {
    fetcher: F,
    locality: L,
    base_url: String,
}

impl MeteoProvider {
    /// Provider with the reqwest fetcher and Nominatim locality names
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let fetcher = HttpFetcher::from_config(config)?;
        let locality = NominatimLocality::new(fetcher.clone(), config.geocode_url.clone());
        Ok(Self::new(fetcher, locality, config.api_url.clone()))
    }
}

impl<F: Fetcher, L: LocalityResolver> MeteoProvider<F, L> {
    pub fn new(fetcher: F, locality: L, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            locality,
            base_url: base_url.into(),
        }
    }

    /// Swap the locality resolver, e.g. for a user-named location
    pub fn with_locality<L2: LocalityResolver>(self, locality: L2) -> MeteoProvider<F, L2> {
        MeteoProvider {
            fetcher: self.fetcher,
            locality,
            base_url: self.base_url,
        }
    }

    /// Open-Meteo asks clients not to retry failed requests
    pub fn should_retry(&self) -> bool {
        false
    }

    /// Weather for a coordinate pair; `None` when the request failed
    pub async fn by_location(&self, lat: f64, lon: f64, units: UnitSystem) -> Option<WeatherResult> {
        self.by_selector(&coordinates_selector(lat, lon), units).await
    }

    /// Weather for an explicit selector; `None` when the request failed
    pub async fn by_selector(&self, selector: &str, units: UnitSystem) -> Option<WeatherResult> {
        match self.fetch_by_selector(selector, units).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(
                    "Weather request failed (selector = {}, units = {:?}): {}",
                    selector,
                    units,
                    e
                );
                None
            }
        }
    }

    pub async fn fetch_by_location(
        &self,
        lat: f64,
        lon: f64,
        units: UnitSystem,
    ) -> Result<WeatherResult, WeatherError> {
        self.fetch_by_selector(&coordinates_selector(lat, lon), units)
            .await
    }

    /// Fetch, parse and assemble; any top-level failure is returned as an error
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_selector(
        &self,
        selector: &str,
        units: UnitSystem,
    ) -> Result<WeatherResult, WeatherError> {
        let url = build_request_url(&self.base_url, selector, units);

        let body = self
            .fetcher
            .retrieve(&url)
            .await
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| WeatherError::NoResponse(url.clone()))?;
        tracing::debug!("Condition URL = {} returning a response of {}", url, body);

        let parsed = parse_response(&body, units, Local::now().date_naive())?;
        let locality = self.locality.locality(selector).await;

        let current = parsed.current;
        let is_day = current.is_day != 0;

        let result = WeatherResult {
            selector: selector.to_string(),
            locality,
            condition: label_for(current.weather_code).to_string(),
            condition_code: icon_for(current.weather_code, is_day),
            temperature: current.temperature_2m as f32,
            humidity: current.relative_humidity_2m as f32,
            wind_speed: current.wind_speed_10m as f32,
            wind_direction: current.wind_direction_10m,
            units,
            forecasts: parsed.forecasts,
            timestamp_millis: Utc::now().timestamp_millis(),
        };

        tracing::info!(
            "Weather updated for {}: {} {}{}",
            result.locality,
            result.condition,
            result.temperature,
            result.temperature_unit()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::FixedLocality;
    use crate::types::MIN_FORECAST_DAYS;
    use serde_json::json;
    use std::sync::Mutex;

    /// Fetcher returning a canned body and recording requested URLs
    struct CannedFetcher {
        body: Option<String>,
        urls: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(body: Option<String>) -> Self {
            Self {
                body,
                urls: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Fetcher for CannedFetcher {
        async fn retrieve(&self, url: &str) -> Option<String> {
            self.urls.lock().unwrap().push(url.to_string());
            self.body.clone()
        }
    }

    fn response(days: usize) -> Value {
        json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "current": {
                "time": "2024-02-27T12:00",
                "temperature_2m": 7.4,
                "relative_humidity_2m": 81,
                "is_day": 1,
                "weather_code": 2,
                "wind_speed_10m": 12.3,
                "wind_direction_10m": 245
            },
            "daily": {
                "time": vec!["2024-02-27"; days],
                "weather_code": vec![61; days],
                "temperature_2m_max": vec![9.1; days],
                "temperature_2m_min": vec![2.3; days]
            }
        })
    }

    fn provider(body: Option<String>) -> MeteoProvider<CannedFetcher, FixedLocality> {
        MeteoProvider::new(
            CannedFetcher::new(body),
            FixedLocality("Berlin".to_string()),
            "https://api.open-meteo.com/v1/forecast",
        )
    }

    #[test]
    fn test_metric_url_has_no_unit_overrides() {
        let url = build_request_url(
            "https://api.open-meteo.com/v1/forecast",
            "lat=52.520000&lon=13.410000",
            UnitSystem::Metric,
        );
        assert_eq!(
            url,
            "https://api.open-meteo.com/v1/forecast?latitude=52.520000&longitude=13.410000\
             &current=temperature_2m,relative_humidity_2m,is_day,weather_code,wind_speed_10m,wind_direction_10m\
             &daily=weather_code,temperature_2m_max,temperature_2m_min"
        );
        assert!(!url.contains("fahrenheit"));
        assert!(!url.contains("mph"));
        assert!(!url.contains("inch"));
    }

    #[test]
    fn test_imperial_url_has_unit_overrides() {
        let url = build_request_url("http://x/v1/forecast", "lat=1&lon=2", UnitSystem::Imperial);
        assert!(url.contains("temperature_unit=fahrenheit"));
        assert!(url.contains("wind_speed_unit=mph"));
        assert!(url.contains("precipitation_unit=inch"));
    }

    #[test]
    fn test_selector_query_keeps_other_parameters() {
        assert_eq!(
            selector_query("lat=1.5&lon=2.5&timezone=auto"),
            "latitude=1.5&longitude=2.5&timezone=auto"
        );
        assert_eq!(selector_query("latitude=1&longitude=2"), "latitude=1&longitude=2");
    }

    #[test]
    fn test_coordinates_selector_precision() {
        assert_eq!(
            coordinates_selector(47.6062, -122.3321),
            "lat=47.606200&lon=-122.332100"
        );
    }

    #[tokio::test]
    async fn test_by_location_assembles_result() {
        let provider = provider(Some(response(7).to_string()));

        let result = provider
            .by_location(52.52, 13.41, UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(result.selector, "lat=52.520000&lon=13.410000");
        assert_eq!(result.locality, "Berlin");
        assert_eq!(result.condition, "Partly Cloudy");
        assert_eq!(result.condition_code, 28);
        assert_eq!(result.temperature, 7.4);
        assert_eq!(result.humidity, 81.0);
        assert_eq!(result.wind_speed, 12.3);
        assert_eq!(result.wind_direction, 245);
        assert!(result.is_metric());
        assert_eq!(result.forecasts.len(), 7);
        assert_eq!(result.forecasts[0].condition, "Light Rain");
        assert!(result.timestamp_millis > 0);

        let urls = provider.fetcher.requested();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("latitude=52.520000&longitude=13.410000"));
    }

    #[tokio::test]
    async fn test_night_uses_night_icon() {
        let mut body = response(5);
        body["current"]["is_day"] = json!(0);
        body["current"]["weather_code"] = json!(0);

        let result = provider(Some(body.to_string()))
            .by_selector("lat=1&lon=2", UnitSystem::Imperial)
            .await
            .unwrap();

        assert_eq!(result.condition, "Clear Sky");
        assert_eq!(result.condition_code, 31);
        assert!(!result.is_metric());
        assert!(result.forecasts.iter().all(|d| !d.is_metric()));
    }

    #[tokio::test]
    async fn test_float_integer_fields_are_truncated() {
        let mut body = response(5);
        body["current"]["wind_direction_10m"] = json!(245.9);
        body["current"]["relative_humidity_2m"] = json!(80.6);

        let result = provider(Some(body.to_string()))
            .fetch_by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(result.wind_direction, 245);
        assert_eq!(result.humidity, 80.0);
    }

    #[tokio::test]
    async fn test_short_forecast_is_padded() {
        let result = provider(Some(response(2).to_string()))
            .by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(result.forecasts.len(), MIN_FORECAST_DAYS);
        assert!(result.forecasts[2..].iter().all(DailyForecast::is_placeholder));
    }

    #[tokio::test]
    async fn test_missing_current_returns_none() {
        let mut body = response(5);
        body.as_object_mut().unwrap().remove("current");

        let result = provider(Some(body.to_string()))
            .by_location(1.0, 2.0, UnitSystem::Metric)
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_wrong_type_in_current_is_malformed() {
        let mut body = response(5);
        body["current"]["temperature_2m"] = json!("warm");

        let result = provider(Some(body.to_string()))
            .fetch_by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await;

        assert!(matches!(result, Err(WeatherError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_empty_daily_fails_whole_request() {
        let result = provider(Some(response(0).to_string()))
            .fetch_by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await;

        assert!(matches!(result, Err(WeatherError::EmptyForecast)));
    }

    #[tokio::test]
    async fn test_no_response_returns_none() {
        let provider = provider(None);
        assert!(provider
            .by_location(1.0, 2.0, UnitSystem::Metric)
            .await
            .is_none());
        assert!(!provider.should_retry());
        assert_eq!(provider.fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_response_is_no_response() {
        let result = provider(Some("   ".to_string()))
            .fetch_by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await;

        assert!(matches!(result, Err(WeatherError::NoResponse(_))));
    }

    #[tokio::test]
    async fn test_not_json_returns_none() {
        let result = provider(Some("<html>busy</html>".to_string()))
            .by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_with_locality_replaces_resolver() {
        let provider = provider(Some(response(5).to_string()))
            .with_locality(FixedLocality("Cabin".to_string()));

        let result = provider
            .by_selector("lat=1&lon=2", UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(result.locality, "Cabin");
    }
}

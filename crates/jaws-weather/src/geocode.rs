//! Locality names for location selectors.
//! The default resolver uses Nominatim (OpenStreetMap) - free, no API key required.

use std::future::Future;

use serde::Deserialize;

use crate::http::HttpFetcher;

/// Resolves a human-readable place name for a location selector
pub trait LocalityResolver: Send + Sync {
    fn locality(&self, selector: &str) -> impl Future<Output = String> + Send;
}

/// Latitude/longitude carried by a selector such as `lat=47.6&lon=-122.3`
pub fn selector_coordinates(selector: &str) -> Option<(f64, f64)> {
    let mut lat = None;
    let mut lon = None;

    for pair in selector.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key.trim() {
            "lat" | "latitude" => lat = value.trim().parse::<f64>().ok(),
            "lon" | "longitude" => lon = value.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    Some((lat?, lon?))
}

/// Fallback name when no place could be resolved
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{:.2}, {:.2}", lat, lon)
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// "Place, State" with the most specific place available
    fn place_name(self) -> Option<String> {
        let state = self.state.clone();
        let country = self.country.clone();

        // Prefer city > town > village > municipality for the primary place name
        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state_district)
            .or(self.county)
            .or(self.state)
            .or(self.country)?;

        let suffix = state
            .filter(|s| !s.is_empty() && *s != place)
            .or_else(|| country.filter(|c| !c.is_empty() && *c != place));

        Some(match suffix {
            Some(s) => format!("{}, {}", place, s),
            None => place,
        })
    }
}

/// Reverse geocoding through a Nominatim `/reverse` endpoint
#[derive(Debug, Clone)]
pub struct NominatimLocality {
    fetcher: HttpFetcher,
    base_url: String,
}

impl NominatimLocality {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Option<String> {
        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
            self.base_url, lat, lon
        );

        let body = match self.fetcher.get(&url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        let response: NominatimResponse = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        response.address?.place_name()
    }
}

impl LocalityResolver for NominatimLocality {
    async fn locality(&self, selector: &str) -> String {
        let Some((lat, lon)) = selector_coordinates(selector) else {
            tracing::debug!("Selector {:?} carries no coordinates", selector);
            return selector.to_string();
        };

        match self.reverse(lat, lon).await {
            Some(name) => {
                tracing::info!("Reverse geocoded to: {}", name);
                name
            }
            None => coordinate_label(lat, lon),
        }
    }
}

/// Resolver for a location the user named themselves
#[derive(Debug, Clone)]
pub struct FixedLocality(pub String);

impl LocalityResolver for FixedLocality {
    async fn locality(&self, _selector: &str) -> String {
        self.0.clone()
    }
}

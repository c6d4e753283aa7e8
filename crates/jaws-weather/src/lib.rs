//! Weather service for jaws
//!
//! Fetches current conditions and a daily forecast from the Open-Meteo API,
//! maps WMO weather codes to widget labels and icons, and caches the last
//! result.

pub mod cache;
pub mod condition;
pub mod forecast;
pub mod geocode;
pub mod http;
pub mod provider;
pub mod types;

pub use cache::WeatherCache;
pub use condition::{icon_for, label_for, Condition};
pub use geocode::{FixedLocality, LocalityResolver, NominatimLocality};
pub use http::{Fetcher, HttpFetcher};
pub use provider::{build_request_url, coordinates_selector, MeteoProvider};
pub use types::*;

use jaws_core::UnitSystem;
use serde::{Deserialize, Serialize};

/// Number of forecast slots renderers lay out
pub const MIN_FORECAST_DAYS: usize = 5;

/// Day label of a placeholder forecast entry
pub const PLACEHOLDER_DAY: &str = "NaN";

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub low: f32,
    pub high: f32,
    pub condition: String,
    pub condition_code: i32,
    /// Calendar date (`YYYY-MM-DD`) the entry is for
    pub day: String,
    pub units: UnitSystem,
}

impl DailyForecast {
    /// Stand-in for a day the provider did not deliver or delivered broken.
    /// Renderers show an empty slot for it.
    pub fn placeholder(units: UnitSystem) -> Self {
        Self {
            low: 0.0,
            high: 0.0,
            condition: String::new(),
            condition_code: crate::condition::ICON_UNKNOWN,
            day: PLACEHOLDER_DAY.to_string(),
            units,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.condition_code == crate::condition::ICON_UNKNOWN && self.day == PLACEHOLDER_DAY
    }

    pub fn is_metric(&self) -> bool {
        self.units.is_metric()
    }
}

/// Current conditions plus daily forecast for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    /// Location selector the data was requested for (`lat=..&lon=..`)
    pub selector: String,
    pub locality: String,
    pub condition: String,
    pub condition_code: i32,
    pub temperature: f32,
    pub humidity: f32,
    pub wind_speed: f32,
    /// Degrees, meteorological convention
    pub wind_direction: i32,
    pub units: UnitSystem,
    /// Always at least [`MIN_FORECAST_DAYS`] entries
    pub forecasts: Vec<DailyForecast>,
    /// Wall clock time of the update, milliseconds since the epoch
    pub timestamp_millis: i64,
}

impl WeatherResult {
    pub fn is_metric(&self) -> bool {
        self.units.is_metric()
    }

    pub fn temperature_unit(&self) -> &'static str {
        if self.is_metric() {
            "°C"
        } else {
            "°F"
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        if self.is_metric() {
            "km/h"
        } else {
            "mph"
        }
    }
}

/// Failures that abort a whole weather request
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("No response from {0}")]
    NoResponse(String),
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Forecast series `{0}` missing or not an array")]
    MissingSeries(&'static str),
    #[error("Forecast contains no days")]
    EmptyForecast,
    #[error("Cache error: {0}")]
    Cache(String),
}

/// Failure reading a single forecast day. Never aborts a request: the day is
/// replaced by [`DailyForecast::placeholder`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DayError {
    #[error("series `{0}` missing or not an array")]
    MissingSeries(&'static str),
    #[error("`{series}` has no entry for day {index}")]
    OutOfRange { series: &'static str, index: usize },
    #[error("`{series}` entry for day {index} is not a number")]
    NotANumber { series: &'static str, index: usize },
}

impl From<WeatherError> for jaws_core::AppError {
    fn from(e: WeatherError) -> Self {
        use jaws_core::{ReqwestErrorExt, WeatherError as CoreWeatherError};

        match e {
            WeatherError::Network(e) => jaws_core::AppError::Network(e.into_network_error()),
            WeatherError::NoResponse(url) => {
                jaws_core::AppError::Weather(CoreWeatherError::NoData(url))
            }
            WeatherError::Cache(msg) => {
                jaws_core::AppError::Weather(CoreWeatherError::CacheError(msg))
            }
            other => jaws_core::AppError::Weather(CoreWeatherError::MalformedData(other.to_string())),
        }
    }
}

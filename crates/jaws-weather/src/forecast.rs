//! Daily forecast parsing.
//!
//! Open-Meteo returns the daily block as parallel arrays indexed by day
//! offset. A broken day is replaced by a placeholder; only a missing or empty
//! `time` series fails the whole forecast.

use chrono::{Days, NaiveDate};
use jaws_core::UnitSystem;
use serde_json::{Map, Value};

use crate::condition::{icon_for, label_for};
use crate::types::{DailyForecast, DayError, WeatherError, MIN_FORECAST_DAYS, PLACEHOLDER_DAY};

pub const SERIES_TIME: &str = "time";
pub const SERIES_MIN: &str = "temperature_2m_min";
pub const SERIES_MAX: &str = "temperature_2m_max";
pub const SERIES_CODE: &str = "weather_code";

/// Parse the `daily` object into at least [`MIN_FORECAST_DAYS`] entries.
///
/// `today` is the date of day offset 0 and is used to label each entry.
pub fn parse_daily(
    daily: &Map<String, Value>,
    units: UnitSystem,
    today: NaiveDate,
) -> Result<Vec<DailyForecast>, WeatherError> {
    let count = daily
        .get(SERIES_TIME)
        .and_then(Value::as_array)
        .ok_or(WeatherError::MissingSeries(SERIES_TIME))?
        .len();

    if count == 0 {
        return Err(WeatherError::EmptyForecast);
    }

    let mut forecasts = Vec::with_capacity(count.max(MIN_FORECAST_DAYS));

    for index in 0..count {
        let item = match parse_day(daily, index, units, today) {
            Ok(day) => day,
            Err(e) => {
                tracing::warn!("Invalid forecast for day {}, using placeholder: {}", index, e);
                DailyForecast::placeholder(units)
            }
        };
        forecasts.push(item);
    }

    // Renderers lay out a fixed number of slots
    for index in forecasts.len()..MIN_FORECAST_DAYS {
        tracing::warn!("Missing forecast for day {}, using placeholder", index);
        forecasts.push(DailyForecast::placeholder(units));
    }

    Ok(forecasts)
}

fn parse_day(
    daily: &Map<String, Value>,
    index: usize,
    units: UnitSystem,
    today: NaiveDate,
) -> Result<DailyForecast, DayError> {
    let low = number_at(daily, SERIES_MIN, index)?;
    let high = number_at(daily, SERIES_MAX, index)?;
    let code = number_at(daily, SERIES_CODE, index)? as i32;

    // Forecast days carry no day/night context; the day icon is used
    Ok(DailyForecast {
        low: low as f32,
        high: high as f32,
        condition: label_for(code).to_string(),
        condition_code: icon_for(code, true),
        day: day_label(today, index),
        units,
    })
}

fn number_at(daily: &Map<String, Value>, series: &'static str, index: usize) -> Result<f64, DayError> {
    let values = daily
        .get(series)
        .and_then(Value::as_array)
        .ok_or(DayError::MissingSeries(series))?;

    values
        .get(index)
        .ok_or(DayError::OutOfRange { series, index })?
        .as_f64()
        .ok_or(DayError::NotANumber { series, index })
}

/// `YYYY-MM-DD` of `today + offset`
pub fn day_label(today: NaiveDate, offset: usize) -> String {
    today
        .checked_add_days(Days::new(offset as u64))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| PLACEHOLDER_DAY.to_string())
}

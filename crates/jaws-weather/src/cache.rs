//! Last successful weather result, persisted as JSON so widgets can render
//! immediately and skip requests while the data is still fresh.

use crate::types::{WeatherError, WeatherResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CACHE_FILE: &str = "weather_cache.json";

#[derive(Debug)]
pub struct WeatherCache {
    cache_path: PathBuf,
    data: Option<WeatherResult>,
}

impl WeatherCache {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            cache_path: config_dir.join(CACHE_FILE),
            data: None,
        }
    }

    /// Read the cache file. A missing file leaves the cache empty; an
    /// unreadable one is discarded with a warning.
    pub fn load(&mut self) -> Option<&WeatherResult> {
        self.data = match fs::read_to_string(&self.cache_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Discarding unreadable weather cache: {}", e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read weather cache {:?}: {}", self.cache_path, e);
                None
            }
        };
        self.data.as_ref()
    }

    pub fn store(&mut self, result: &WeatherResult) -> Result<(), WeatherError> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| WeatherError::Cache(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(result)
            .map_err(|e| WeatherError::Cache(e.to_string()))?;
        fs::write(&self.cache_path, json).map_err(|e| WeatherError::Cache(e.to_string()))?;

        tracing::debug!("Cached weather for {} at {:?}", result.selector, self.cache_path);
        self.data = Some(result.clone());
        Ok(())
    }

    pub fn get(&self) -> Option<&WeatherResult> {
        self.data.as_ref()
    }

    /// Cached result for `selector` that is younger than `max_age` at `now_millis`
    pub fn fresh_for(&self, selector: &str, max_age: Duration, now_millis: i64) -> Option<&WeatherResult> {
        self.data
            .as_ref()
            .filter(|r| r.selector == selector && is_fresh(r, max_age, now_millis))
    }
}

/// True when the result is younger than `max_age`. Results stamped in the
/// future (clock changes) or too far apart to subtract count as stale.
pub fn is_fresh(result: &WeatherResult, max_age: Duration, now_millis: i64) -> bool {
    match now_millis.checked_sub(result.timestamp_millis) {
        Some(age) => age >= 0 && (age as u128) < max_age.as_millis(),
        None => false,
    }
}

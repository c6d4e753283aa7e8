pub mod app;
pub mod config;
pub mod error;
pub mod widget_prefs;

pub use app::App;
pub use config::{Config, UnitSystem, ValidationResult, WeatherConfig, WidgetsConfig};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};
pub use widget_prefs::{BgTransparency, ColorTheme, WidgetPrefs};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jaws core initialized");
    Ok(())
}

use crate::{AppError, Config, ConfigError, WidgetPrefs};

/// Application state: loaded configuration plus the widget preference store
pub struct App {
    config: Config,
    prefs: WidgetPrefs,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self, AppError> {
        let (config, _) =
            Config::load_validated().map_err(|e| ConfigError::Invalid(format!("{:#}", e)))?;
        Self::with_config(config)
    }

    /// Create an application instance around an already loaded configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let prefs = WidgetPrefs::load(config.prefs_path())
            .map_err(|e| AppError::Prefs(format!("{:#}", e)))?;
        tracing::debug!("Widget prefs loaded from {:?}", prefs.path());

        Ok(Self { config, prefs })
    }

    /// Shutdown the application, flushing widget preferences if they changed
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        tracing::info!("Shutting down application");
        if !self.prefs.is_dirty() {
            return Ok(());
        }
        self.prefs
            .save()
            .map_err(|e| AppError::Prefs(format!("{:#}", e)))
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prefs(&self) -> &WidgetPrefs {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut WidgetPrefs {
        &mut self.prefs
    }
}

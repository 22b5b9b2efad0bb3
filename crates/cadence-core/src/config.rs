use anyhow::Result;
use chrono::TimeDelta;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_MAX_WINDOW_DAYS, DEFAULT_MONTHS_AFTER, DEFAULT_MONTHS_BEFORE,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Widest query window accepted, in days.
    pub max_window_days: i64,
    /// Default window span before "now", in months.
    pub default_months_before: u32,
    /// Default window span after "now", in months.
    pub default_months_after: u32,
}

impl EngineConfig {
    /// ## Summary
    /// Returns the maximum window width as a duration.
    #[must_use]
    pub fn max_window(&self) -> TimeDelta {
        TimeDelta::days(self.max_window_days)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            default_months_before: DEFAULT_MONTHS_BEFORE,
            default_months_after: DEFAULT_MONTHS_AFTER,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into `Settings`. Environment variables are applied first
    /// and the file, when present, overrides them.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("engine.max_window_days", DEFAULT_MAX_WINDOW_DAYS)?
            .set_default(
                "engine.default_months_before",
                i64::from(DEFAULT_MONTHS_BEFORE),
            )?
            .set_default(
                "engine.default_months_after",
                i64::from(DEFAULT_MONTHS_AFTER),
            )?
            .set_default("logging.level", "info")?
            // Environment, e.g. CADENCE_ENGINE__MAX_WINDOW_DAYS
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

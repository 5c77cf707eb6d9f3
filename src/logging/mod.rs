//! # Logging System
//!
//! `log` facade with per-feature targets (see [`features`]) on top of an
//! `env_logger` formatter. Feature levels come from [`config::LogConfig`] and
//! can be changed at runtime with [`LoggingSystem::update_feature_level`].

pub mod config;
pub mod features;

use crate::config::CatalogConfig;
use config::{parse_level, LogConfig};
use features::LogFeature;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Global logging configuration instance
static LOGGING_CONFIG: OnceCell<Arc<RwLock<LogConfig>>> = OnceCell::new();

/// Effective thresholds read on every log call, so they sit behind a
/// blocking lock rather than the async one above.
static THRESHOLDS: Lazy<std::sync::RwLock<Thresholds>> =
    Lazy::new(|| std::sync::RwLock::new(Thresholds::default()));

#[derive(Debug, Clone)]
struct Thresholds {
    default: log::LevelFilter,
    features: HashMap<&'static str, log::LevelFilter>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            default: log::LevelFilter::Info,
            features: HashMap::new(),
        }
    }
}

impl Thresholds {
    fn from_config(config: &LogConfig) -> Self {
        let features = config
            .features
            .iter()
            .filter_map(|(name, level)| {
                Some((LogFeature::from_name(name)?.target(), parse_level(level)?))
            })
            .collect();
        Self {
            default: parse_level(&config.general.default_level).unwrap_or(log::LevelFilter::Info),
            features,
        }
    }

    fn for_target(&self, target: &str) -> log::LevelFilter {
        self.features
            .iter()
            .find(|(prefix, _)| target.starts_with(*prefix))
            .map(|(_, level)| *level)
            .unwrap_or(self.default)
    }

    fn max(&self) -> log::LevelFilter {
        self.features
            .values()
            .copied()
            .fold(self.default, std::cmp::max)
    }
}

/// Formats through `env_logger`, filters through [`THRESHOLDS`].
struct FeatureLogger {
    inner: env_logger::Logger,
}

impl log::Log for FeatureLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        match THRESHOLDS.read() {
            Ok(thresholds) => metadata.level() <= thresholds.for_target(metadata.target()),
            Err(_) => false,
        }
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Process-wide logging setup for the catalog.
pub struct LoggingSystem;

impl LoggingSystem {
    /// Initialize the logging system with default configuration
    pub async fn init_default() -> Result<(), LoggingError> {
        let config = LogConfig::from_env()?;
        Self::init_with_config(config).await
    }

    /// Initialize the logging system with a custom configuration
    pub async fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
        config.validate()?;

        let thresholds = Thresholds::from_config(&config);
        let max_level = thresholds.max();
        let console_enabled = config.console.enabled;
        let include_timestamp = config.console.include_timestamp;
        let include_module = config.console.include_module;

        let config_arc = Arc::new(RwLock::new(config));
        LOGGING_CONFIG
            .set(config_arc)
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        Self::store_thresholds(thresholds)?;

        if console_enabled {
            let mut builder = env_logger::Builder::new();
            builder
                .filter_level(log::LevelFilter::Trace)
                .format_module_path(include_module);
            if !include_timestamp {
                builder.format_timestamp(None);
            }
            let logger = FeatureLogger {
                inner: builder.build(),
            };
            // Another logger may already be installed (test harnesses do this).
            if log::set_boxed_logger(Box::new(logger)).is_ok() {
                log::set_max_level(max_level);
            }
        }

        Ok(())
    }

    /// Get the global logging configuration
    pub async fn get_config() -> Option<LogConfig> {
        if let Some(config_arc) = LOGGING_CONFIG.get() {
            let config_guard = config_arc.read().await;
            Some(config_guard.clone())
        } else {
            None
        }
    }

    /// Update feature-specific log level
    pub async fn update_feature_level(feature: &str, level: &str) -> Result<(), LoggingError> {
        let config_arc = LOGGING_CONFIG
            .get()
            .ok_or_else(|| LoggingError::Config("Logging system not initialized".to_string()))?;

        let feature = LogFeature::from_name(feature)
            .ok_or_else(|| LoggingError::Config(format!("Unknown logging feature: {}", feature)))?;
        let level = level.to_uppercase();
        parse_level(&level)
            .ok_or_else(|| LoggingError::Config(format!("Invalid log level: {}", level)))?;

        let mut config_guard = config_arc.write().await;
        config_guard
            .features
            .insert(feature.name().to_string(), level);

        let thresholds = Thresholds::from_config(&config_guard);
        let max_level = thresholds.max();
        Self::store_thresholds(thresholds)?;
        if max_level > log::max_level() {
            log::set_max_level(max_level);
        }

        Ok(())
    }

    /// Get available features and their current levels
    pub async fn get_features() -> Option<HashMap<String, String>> {
        if let Some(config_arc) = LOGGING_CONFIG.get() {
            let config_guard = config_arc.read().await;
            Some(config_guard.features.clone())
        } else {
            None
        }
    }

    /// Reload configuration from file
    pub async fn reload_config_from_file(path: &str) -> Result<(), LoggingError> {
        let new_config = LogConfig::from_file(path)?;
        new_config.validate()?;

        let config_arc = LOGGING_CONFIG
            .get()
            .ok_or_else(|| LoggingError::Config("Logging system not initialized".to_string()))?;
        let mut config_guard = config_arc.write().await;
        let thresholds = Thresholds::from_config(&new_config);
        let max_level = thresholds.max();
        Self::store_thresholds(thresholds)?;
        log::set_max_level(max_level);
        *config_guard = new_config;
        Ok(())
    }

    /// Initialize from the log file named by `config.log_config_path`, or
    /// from defaults plus environment overrides when none is set.
    pub async fn init_from_catalog_config(config: &CatalogConfig) -> Result<(), LoggingError> {
        let log_config = match &config.log_config_path {
            Some(path) => LogConfig::from_file(path)?,
            None => LogConfig::from_env()?,
        };
        Self::init_with_config(log_config).await
    }

    /// Whether a record for `feature` at `level` would currently be emitted.
    pub fn is_enabled(feature: LogFeature, level: log::Level) -> bool {
        THRESHOLDS
            .read()
            .map(|thresholds| level <= thresholds.for_target(feature.target()))
            .unwrap_or(false)
    }

    fn store_thresholds(thresholds: Thresholds) -> Result<(), LoggingError> {
        let mut guard = THRESHOLDS
            .write()
            .map_err(|_| LoggingError::Config("Threshold lock poisoned".to_string()))?;
        *guard = thresholds;
        Ok(())
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_match_feature_prefix() {
        let mut config = LogConfig::default();
        config.general.default_level = "WARN".to_string();
        config
            .features
            .insert("hydration".to_string(), "DEBUG".to_string());

        let thresholds = Thresholds::from_config(&config);
        assert_eq!(
            thresholds.for_target("field_catalog::hydration"),
            log::LevelFilter::Debug
        );
        assert_eq!(thresholds.for_target("sled::tree"), log::LevelFilter::Warn);
        assert_eq!(thresholds.max(), log::LevelFilter::Debug);
    }
}

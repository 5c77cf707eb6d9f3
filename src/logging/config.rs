//! Configuration management for the logging system
//!
//! Loaded from TOML, overridable through `FIELD_CATALOG_LOG_*` environment
//! variables, and updatable at runtime through [`super::LoggingSystem`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::features::LogFeature;

pub const VALID_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Main logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// General logging settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Console output configuration
    #[serde(default)]
    pub console: ConsoleConfig,
    /// Feature-specific log levels, keyed by [`LogFeature::name`]
    #[serde(default = "LogConfig::default_features")]
    pub features: HashMap<String, String>,
}

/// General logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default log level for all modules
    pub default_level: String,
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Enable console output
    pub enabled: bool,
    /// Include timestamps
    pub include_timestamp: bool,
    /// Include module path
    pub include_module: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            console: ConsoleConfig::default(),
            features: Self::default_features(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_level: "INFO".to_string(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_timestamp: true,
            include_module: true,
        }
    }
}

impl LogConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let mut config: LogConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = std::env::var("FIELD_CATALOG_LOG_LEVEL") {
            self.general.default_level = level.to_uppercase();
        }
        if let Ok(enabled) = std::env::var("FIELD_CATALOG_LOG_CONSOLE_ENABLED") {
            self.console.enabled = enabled.parse().unwrap_or(true);
        }

        for (key, value) in std::env::vars() {
            if let Some(feature) = key.strip_prefix("FIELD_CATALOG_LOG_FEATURE_") {
                self.features
                    .insert(feature.to_lowercase(), value.to_uppercase());
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }

        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// Get default feature-specific log levels
    fn default_features() -> HashMap<String, String> {
        let mut features = HashMap::new();
        features.insert(LogFeature::Sync.name().to_string(), "INFO".to_string());
        features.insert(LogFeature::Classify.name().to_string(), "WARN".to_string());
        features.insert(LogFeature::Hydration.name().to_string(), "INFO".to_string());
        features.insert(LogFeature::Naming.name().to_string(), "INFO".to_string());
        features.insert(LogFeature::Database.name().to_string(), "WARN".to_string());
        features
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.general.default_level.as_str()) {
            return Err(ConfigError::InvalidLevel(
                self.general.default_level.clone(),
            ));
        }

        for (feature, level) in &self.features {
            if LogFeature::from_name(feature).is_none() {
                return Err(ConfigError::UnknownFeature(feature.clone()));
            }
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidFeatureLevel(
                    feature.clone(),
                    level.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Parses one of [`VALID_LEVELS`].
pub fn parse_level(level: &str) -> Option<log::LevelFilter> {
    match level {
        "TRACE" => Some(log::LevelFilter::Trace),
        "DEBUG" => Some(log::LevelFilter::Debug),
        "INFO" => Some(log::LevelFilter::Info),
        "WARN" => Some(log::LevelFilter::Warn),
        "ERROR" => Some(log::LevelFilter::Error),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Invalid log level for feature '{0}': {1}")]
    InvalidFeatureLevel(String, String),
    #[error("Unknown logging feature: {0}")]
    UnknownFeature(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = LogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.features.len(), LogFeature::ALL.len());
    }

    #[test]
    fn test_invalid_levels_are_rejected() {
        let mut config = LogConfig::default();
        config.general.default_level = "LOUD".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLevel(_))));

        let mut config = LogConfig::default();
        config
            .features
            .insert("sync".to_string(), "VERBOSE".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFeatureLevel(_, _))
        ));

        let mut config = LogConfig::default();
        config
            .features
            .insert("network".to_string(), "INFO".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::UnknownFeature(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logging.toml");

        let mut config = LogConfig::default();
        config
            .features
            .insert("hydration".to_string(), "DEBUG".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = LogConfig::from_file(&path).unwrap();
        assert_eq!(loaded.features.get("hydration").map(String::as_str), Some("DEBUG"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        std::fs::write(&path, "[general]\ndefault_level = \"WARN\"\n").unwrap();

        let loaded = LogConfig::from_file(&path).unwrap();
        assert!(loaded.console.enabled);
        assert!(loaded.features.contains_key("sync"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("debug"), None);
    }
}

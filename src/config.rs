use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a [`crate::FieldCatalog`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory of the sled database holding the metadata
    pub storage_path: PathBuf,
    /// Discard the database when the catalog is dropped
    #[serde(default)]
    pub temporary: bool,
    /// Optional TOML file read by [`crate::LoggingSystem::init_from_catalog_config`]
    #[serde(default)]
    pub log_config_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("data/catalog"),
            temporary: false,
            log_config_path: None,
        }
    }
}

impl CatalogConfig {
    /// Create a new catalog configuration with the specified storage path
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            ..Default::default()
        }
    }

    /// A configuration whose database is removed on drop.
    pub fn temporary(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            temporary: true,
            ..Default::default()
        }
    }

    pub fn with_log_config(mut self, path: PathBuf) -> Self {
        self.log_config_path = Some(path);
        self
    }
}

/// Load catalog configuration from the provided path or the
/// `FIELD_CATALOG_CONFIG` environment variable, then
/// `config/catalog_config.json`.
///
/// A missing file yields [`CatalogConfig::default`]; a file that exists but
/// does not parse is an error.
pub fn load_catalog_config(path: Option<&str>) -> Result<CatalogConfig, std::io::Error> {
    use std::fs;

    let config_path = path
        .map(|p| p.to_string())
        .or_else(|| std::env::var("FIELD_CATALOG_CONFIG").ok())
        .unwrap_or_else(|| "config/catalog_config.json".to_string());

    match fs::read_to_string(&config_path) {
        Ok(config_str) => serde_json::from_str::<CatalogConfig>(&config_str).map_err(|e| {
            log::error!("Failed to parse catalog configuration {}: {}", config_path, e);
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No catalog configuration at {}, using defaults", config_path);
            Ok(CatalogConfig::default())
        }
        Err(e) => Err(e),
    }
}

use field_catalog::logging::config::LogConfig;
use field_catalog::logging::features::LogFeature;
use field_catalog::{CatalogConfig, LoggingError, LoggingSystem};

// The logging system is process-global, so the whole lifecycle runs in one test.
#[tokio::test]
async fn test_logging_system_lifecycle() {
    assert!(LoggingSystem::get_config().await.is_none());
    assert!(LoggingSystem::update_feature_level("sync", "DEBUG").await.is_err());

    let dir = tempfile::tempdir().unwrap();
    let initial_path = dir.path().join("initial.toml");
    let mut config = LogConfig::default();
    config.general.default_level = "WARN".to_string();
    config
        .features
        .insert("hydration".to_string(), "INFO".to_string());
    config.save_to_file(&initial_path).unwrap();

    let catalog_config =
        CatalogConfig::temporary(dir.path().join("catalog")).with_log_config(initial_path);
    LoggingSystem::init_from_catalog_config(&catalog_config)
        .await
        .unwrap();
    let loaded = LoggingSystem::get_config().await.unwrap();
    assert_eq!(loaded.general.default_level, "WARN");

    assert!(matches!(
        LoggingSystem::init_default().await,
        Err(LoggingError::AlreadyInitialized)
    ));

    assert!(LoggingSystem::is_enabled(LogFeature::Hydration, log::Level::Info));
    assert!(!LoggingSystem::is_enabled(LogFeature::Hydration, log::Level::Debug));

    LoggingSystem::update_feature_level("hydration", "debug")
        .await
        .unwrap();
    assert!(LoggingSystem::is_enabled(LogFeature::Hydration, log::Level::Debug));
    let features = LoggingSystem::get_features().await.unwrap();
    assert_eq!(features.get("hydration").map(String::as_str), Some("DEBUG"));

    assert!(matches!(
        LoggingSystem::update_feature_level("transform", "INFO").await,
        Err(LoggingError::Config(_))
    ));
    assert!(matches!(
        LoggingSystem::update_feature_level("sync", "LOUD").await,
        Err(LoggingError::Config(_))
    ));

    let path = dir.path().join("logging.toml");
    let mut reloaded = LogConfig::default();
    reloaded
        .features
        .insert("hydration".to_string(), "ERROR".to_string());
    reloaded.save_to_file(&path).unwrap();
    LoggingSystem::reload_config_from_file(path.to_str().unwrap())
        .await
        .unwrap();
    assert!(!LoggingSystem::is_enabled(LogFeature::Hydration, log::Level::Warn));

    // Reloaded verbosity reaches the `log` facade, not only the thresholds.
    let mut verbose = LogConfig::default();
    verbose
        .features
        .insert("naming".to_string(), "TRACE".to_string());
    verbose.save_to_file(&path).unwrap();
    LoggingSystem::reload_config_from_file(path.to_str().unwrap())
        .await
        .unwrap();
    assert!(LoggingSystem::is_enabled(LogFeature::Naming, log::Level::Trace));
    assert_eq!(log::max_level(), log::LevelFilter::Trace);
    assert!(log::log_enabled!(target: "field_catalog::naming", log::Level::Trace));
    assert!(!log::log_enabled!(target: "field_catalog::sync", log::Level::Debug));
}

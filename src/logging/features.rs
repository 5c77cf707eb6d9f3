//! Feature-specific logging macros and utilities
//!
//! Every log line emitted by the catalog carries one of the targets below so
//! that sync chatter can be silenced without hiding storage warnings.

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    Sync,
    Classify,
    Hydration,
    Naming,
    Database,
}

impl LogFeature {
    pub const ALL: [LogFeature; 5] = [
        LogFeature::Sync,
        LogFeature::Classify,
        LogFeature::Hydration,
        LogFeature::Naming,
        LogFeature::Database,
    ];

    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Sync => "field_catalog::sync",
            LogFeature::Classify => "field_catalog::classify",
            LogFeature::Hydration => "field_catalog::hydration",
            LogFeature::Naming => "field_catalog::naming",
            LogFeature::Database => "field_catalog::database",
        }
    }

    /// Key used for this feature in `LogConfig::features`
    pub fn name(&self) -> &'static str {
        match self {
            LogFeature::Sync => "sync",
            LogFeature::Classify => "classify",
            LogFeature::Hydration => "hydration",
            LogFeature::Naming => "naming",
            LogFeature::Database => "database",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.name().eq_ignore_ascii_case(name))
    }
}

// Sync-specific logging macros
#[macro_export]
macro_rules! log_sync_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "field_catalog::sync", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_sync_info {
    ($($arg:tt)*) => {
        log::info!(target: "field_catalog::sync", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_sync_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "field_catalog::sync", $($arg)*)
    };
}

// Classifier logging macros
#[macro_export]
macro_rules! log_classify_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "field_catalog::classify", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_classify_error {
    ($($arg:tt)*) => {
        log::error!(target: "field_catalog::classify", $($arg)*)
    };
}

// Hydration logging macros
#[macro_export]
macro_rules! log_hydration_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "field_catalog::hydration", $($arg)*)
    };
}

// Naming logging macros
#[macro_export]
macro_rules! log_naming_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "field_catalog::naming", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_naming_error {
    ($($arg:tt)*) => {
        log::error!(target: "field_catalog::naming", $($arg)*)
    };
}

// Database-specific logging macros
#[macro_export]
macro_rules! log_database_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "field_catalog::database", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_database_info {
    ($($arg:tt)*) => {
        log::info!(target: "field_catalog::database", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_database_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "field_catalog::database", $($arg)*)
    };
}

// Performance monitoring helper
pub struct PerformanceTimer {
    start: std::time::Instant,
    feature: LogFeature,
    operation: String,
}

impl PerformanceTimer {
    pub fn new(feature: LogFeature, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        log::debug!(target: feature.target(), "Starting timed operation: {}", operation);
        Self {
            start: std::time::Instant::now(),
            feature,
            operation,
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        log::info!(
            target: self.feature.target(),
            "Operation '{}' completed in {:?}",
            self.operation,
            duration
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_round_trip_through_lookup() {
        for feature in LogFeature::ALL {
            assert_eq!(LogFeature::from_name(feature.name()), Some(feature));
            assert!(feature.target().ends_with(feature.name()));
        }
        assert_eq!(LogFeature::from_name("SYNC"), Some(LogFeature::Sync));
        assert_eq!(LogFeature::from_name("transform"), None);
    }
}

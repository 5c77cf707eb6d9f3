//! Error types for the field catalog.
//!
//! Every fallible operation in the crate returns a [`CatalogError`]. Failures
//! raised by the metadata store are carried unchanged inside
//! [`CatalogError::Store`] so callers can decide on retry policy themselves.

use thiserror::Error;

/// Unified error type for catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The resolved field attributes are not acceptable. Raised before any
    /// write is issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced field or table does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The stored parent/child graph is malformed (for example a cyclic
    /// parent chain).
    #[error("Structural error: {0}")]
    Structural(String),

    /// Failure reported by the metadata store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Returns true if this error was raised by validation rather than by the
    /// store or by a missing reference.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Errors raised by a metadata store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying sled failure
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A stored key does not have the expected layout
    #[error("Corrupt key in tree '{tree}': expected {expected} bytes, found {found}")]
    CorruptKey {
        tree: &'static str,
        expected: usize,
        found: usize,
    },

    /// A write addressed a record that does not exist
    #[error("No record {id} in tree '{tree}'")]
    MissingRecord { tree: &'static str, id: u64 },

    /// Any other adapter failure
    #[error("Store error: {0}")]
    Other(String),
}

impl From<sled::Error> for CatalogError {
    fn from(error: sled::Error) -> Self {
        CatalogError::Store(StoreError::Sled(error))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(error: serde_json::Error) -> Self {
        CatalogError::Store(StoreError::Serde(error))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_is_wrapped_unchanged() {
        let err: CatalogError = StoreError::Other("disk full".to_string()).into();
        match err {
            CatalogError::Store(StoreError::Other(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CatalogError::validation("bad type").to_string(),
            "Validation error: bad type"
        );
        assert_eq!(
            CatalogError::structural("cycle").to_string(),
            "Structural error: cycle"
        );
        assert!(CatalogError::validation("x").is_validation());
        assert!(!CatalogError::not_found("x").is_validation());
    }
}

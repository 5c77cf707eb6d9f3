//! # Field Catalog
//!
//! Metadata layer for the columns of analytics data sources. Every column
//! (and every nested key of a composite column) is a [`Field`] carrying a
//! storage-level [`BaseType`], an optional semantic [`SpecialType`] and a
//! [`VisibilityType`].
//!
//! ## Core Components
//!
//! * `field::types` - Type taxonomy and the special/base type restriction table
//! * `field::classifier` - Name-pattern inference of special types
//! * `field::lifecycle` - Validation hooks and cascade delete
//! * `field::sync` - Create/update reconciliation against discovered columns
//! * `field::curation` - Manual edits and foreign-key linking
//! * `field::hydration` - Batched loading of values and fk targets
//! * `field::naming` - Dotted qualified names
//! * `db_operations` - sled-backed [`MetadataStore`]
//! * `catalog` - [`FieldCatalog`], the entry point over all of the above
//!
//! Schema discovery calls [`FieldCatalog::sync_table`] (or the per-field
//! create/update) repeatedly; reconciliation is idempotent and writes only
//! when an attribute it owns actually changes.

pub mod catalog;
pub mod config;
pub mod db_operations;
pub mod error;
pub mod field;
pub mod humanize;
pub mod logging;
pub mod testing;

pub use catalog::FieldCatalog;
pub use config::{load_catalog_config, CatalogConfig};
pub use db_operations::{DbOperations, MetadataStore};
pub use error::{CatalogError, CatalogResult, StoreError, StoreResult};
pub use field::{
    BaseType, Field, FieldDescriptor, FieldEdit, FieldId, FieldSync, FieldUpdate, FieldValues,
    HydratedField, ImportantFieldRef, NewField, SpecialType, SyncFailure, SyncReport, Table,
    TableId, VisibilityType,
};
pub use humanize::{DefaultHumanizer, Humanize};
pub use logging::{LoggingError, LoggingSystem};

// Core database operations
pub mod core;
mod field_operations;
pub mod store;
mod table_operations;
mod value_operations;

// Re-export the main DbOperations struct and the store boundary
pub use self::core::DbOperations;
pub use store::MetadataStore;

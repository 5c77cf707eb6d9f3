//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use field_catalog::db_operations::DbOperations;
use field_catalog::testing::{create_counting_store, CountingStore};
use field_catalog::{BaseType, DefaultHumanizer, Field, FieldDescriptor, FieldSync, Humanize, Table};

pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A temporary store with one table, behind a call counter.
pub struct CatalogFixture {
    pub store: CountingStore<DbOperations>,
    pub table: Table,
    pub humanizer: DefaultHumanizer,
}

impl CatalogFixture {
    pub fn new(table_name: &str, schema: Option<&str>) -> Self {
        init_test_logging();
        let store = create_counting_store().expect("Failed to open temporary store");
        let table = store
            .inner()
            .insert_table(table_name, schema)
            .expect("Failed to insert table");
        Self {
            store,
            table,
            humanizer: DefaultHumanizer,
        }
    }

    pub fn sync(&self) -> FieldSync<'_, CountingStore<DbOperations>> {
        FieldSync::new(&self.store, &self.humanizer as &dyn Humanize)
    }

    /// Creates a field through the sync path and clears the call counters.
    pub fn create(&self, descriptor: FieldDescriptor) -> Field {
        let field = self
            .sync()
            .create(self.table.id, &descriptor)
            .expect("Failed to create field");
        self.store.reset();
        field
    }

    pub fn create_named(&self, name: &str, base_type: BaseType) -> Field {
        self.create(FieldDescriptor::new(name, base_type))
    }
}

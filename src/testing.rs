//! Helpers shared by unit and integration tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::db_operations::{DbOperations, MetadataStore};
use crate::error::StoreResult;
use crate::field::model::{Field, FieldId, FieldUpdate, FieldValues, NewField, Table, TableId};

/// Store operations counted by [`CountingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertField,
    UpdateField,
    SelectField,
    SelectFieldsByIds,
    SelectFieldsByTable,
    SelectChildFieldIds,
    SelectFieldValues,
    SelectTable,
    DeleteField,
    CascadeDeleteChildren,
    CascadeDeleteValues,
    CascadeDeleteCrossRefs,
}

/// Wraps a store and records how often each operation is called, plus the
/// order of the per-field delete operations.
pub struct CountingStore<S> {
    inner: S,
    calls: Mutex<HashMap<StoreOp, usize>>,
    updates: Mutex<Vec<(FieldId, FieldUpdate)>>,
    deletes: Mutex<Vec<(FieldId, StoreOp)>>,
}

impl<S: MetadataStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            updates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Writes issued so far: inserts, updates and deletes of field rows.
    pub fn writes(&self) -> usize {
        self.count(StoreOp::InsertField) + self.count(StoreOp::UpdateField) + self.count(StoreOp::DeleteField)
    }

    /// Every `update_field` payload, in call order.
    pub fn updates(&self) -> Vec<(FieldId, FieldUpdate)> {
        self.updates
            .lock()
            .map(|updates| updates.clone())
            .unwrap_or_default()
    }

    /// `delete_field` and `cascade_delete_*` calls, in call order.
    pub fn delete_log(&self) -> Vec<(FieldId, StoreOp)> {
        self.deletes
            .lock()
            .map(|deletes| deletes.clone())
            .unwrap_or_default()
    }

    pub fn reset(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
        if let Ok(mut updates) = self.updates.lock() {
            updates.clear();
        }
        if let Ok(mut deletes) = self.deletes.lock() {
            deletes.clear();
        }
    }

    fn record(&self, op: StoreOp) {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(op).or_insert(0) += 1;
        }
    }

    fn record_delete(&self, id: FieldId, op: StoreOp) {
        self.record(op);
        if let Ok(mut deletes) = self.deletes.lock() {
            deletes.push((id, op));
        }
    }
}

impl<S: MetadataStore> MetadataStore for CountingStore<S> {
    fn insert_field(&self, field: NewField) -> StoreResult<FieldId> {
        self.record(StoreOp::InsertField);
        self.inner.insert_field(field)
    }

    fn update_field(&self, id: FieldId, changes: &FieldUpdate) -> StoreResult<()> {
        self.record(StoreOp::UpdateField);
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((id, changes.clone()));
        }
        self.inner.update_field(id, changes)
    }

    fn select_field(&self, id: FieldId) -> StoreResult<Option<Field>> {
        self.record(StoreOp::SelectField);
        self.inner.select_field(id)
    }

    fn select_fields_by_ids(&self, ids: &BTreeSet<FieldId>) -> StoreResult<Vec<Field>> {
        self.record(StoreOp::SelectFieldsByIds);
        self.inner.select_fields_by_ids(ids)
    }

    fn select_fields_by_table(&self, table_id: TableId) -> StoreResult<Vec<Field>> {
        self.record(StoreOp::SelectFieldsByTable);
        self.inner.select_fields_by_table(table_id)
    }

    fn select_child_field_ids(&self, parent_id: FieldId) -> StoreResult<Vec<FieldId>> {
        self.record(StoreOp::SelectChildFieldIds);
        self.inner.select_child_field_ids(parent_id)
    }

    fn select_field_values_by_field_ids(
        &self,
        ids: &BTreeSet<FieldId>,
    ) -> StoreResult<Vec<FieldValues>> {
        self.record(StoreOp::SelectFieldValues);
        self.inner.select_field_values_by_field_ids(ids)
    }

    fn select_table(&self, id: TableId) -> StoreResult<Option<Table>> {
        self.record(StoreOp::SelectTable);
        self.inner.select_table(id)
    }

    fn delete_field(&self, id: FieldId) -> StoreResult<bool> {
        self.record_delete(id, StoreOp::DeleteField);
        self.inner.delete_field(id)
    }

    fn cascade_delete_children(&self, field_id: FieldId) -> StoreResult<()> {
        self.record_delete(field_id, StoreOp::CascadeDeleteChildren);
        self.inner.cascade_delete_children(field_id)
    }

    fn cascade_delete_values(&self, field_id: FieldId) -> StoreResult<()> {
        self.record_delete(field_id, StoreOp::CascadeDeleteValues);
        self.inner.cascade_delete_values(field_id)
    }

    fn cascade_delete_cross_refs(&self, field_id: FieldId) -> StoreResult<()> {
        self.record_delete(field_id, StoreOp::CascadeDeleteCrossRefs);
        self.inner.cascade_delete_cross_refs(field_id)
    }
}

/// Temporary store for tests
pub fn create_temp_db_ops() -> Result<DbOperations, sled::Error> {
    DbOperations::temporary()
}

/// Temporary store wrapped in a [`CountingStore`]
pub fn create_counting_store() -> Result<CountingStore<DbOperations>, sled::Error> {
    Ok(CountingStore::new(DbOperations::temporary()?))
}

/// Inserts a table row directly into `db_ops`.
pub fn create_test_table(
    db_ops: &DbOperations,
    name: &str,
    schema: Option<&str>,
) -> StoreResult<Table> {
    db_ops.insert_table(name, schema)
}

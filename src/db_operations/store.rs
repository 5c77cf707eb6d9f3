use std::collections::BTreeSet;

use super::core::DbOperations;
use crate::error::StoreResult;
use crate::field::model::{Field, FieldId, FieldUpdate, FieldValues, NewField, Table, TableId};

/// Persistence primitives the catalog core relies on.
///
/// Implementations own durability, atomicity and uniqueness guarantees. The
/// core never retries a failed call; errors are handed back to the caller
/// unchanged.
pub trait MetadataStore: Send + Sync {
    /// Persists a new field and returns its id.
    fn insert_field(&self, field: NewField) -> StoreResult<FieldId>;

    /// Applies a partial update to an existing field.
    fn update_field(&self, id: FieldId, changes: &FieldUpdate) -> StoreResult<()>;

    fn select_field(&self, id: FieldId) -> StoreResult<Option<Field>>;

    /// Fields whose id is in `ids`. Missing ids are skipped.
    fn select_fields_by_ids(&self, ids: &BTreeSet<FieldId>) -> StoreResult<Vec<Field>>;

    /// All fields owned by a table, nested fields included.
    fn select_fields_by_table(&self, table_id: TableId) -> StoreResult<Vec<Field>>;

    /// Ids of the fields whose `parent_id` is `parent_id`.
    fn select_child_field_ids(&self, parent_id: FieldId) -> StoreResult<Vec<FieldId>>;

    /// Value dictionaries of every field in `ids`.
    fn select_field_values_by_field_ids(
        &self,
        ids: &BTreeSet<FieldId>,
    ) -> StoreResult<Vec<FieldValues>>;

    fn select_table(&self, id: TableId) -> StoreResult<Option<Table>>;

    /// Removes the field row itself. Returns false if it did not exist.
    fn delete_field(&self, id: FieldId) -> StoreResult<bool>;

    /// Removes the direct child rows of `field_id`. Not transitive.
    fn cascade_delete_children(&self, field_id: FieldId) -> StoreResult<()>;

    fn cascade_delete_values(&self, field_id: FieldId) -> StoreResult<()>;

    fn cascade_delete_cross_refs(&self, field_id: FieldId) -> StoreResult<()>;
}

impl MetadataStore for DbOperations {
    fn insert_field(&self, field: NewField) -> StoreResult<FieldId> {
        self.insert_field_record(field)
    }

    fn update_field(&self, id: FieldId, changes: &FieldUpdate) -> StoreResult<()> {
        self.update_field_record(id, changes)
    }

    fn select_field(&self, id: FieldId) -> StoreResult<Option<Field>> {
        self.get_field(id)
    }

    fn select_fields_by_ids(&self, ids: &BTreeSet<FieldId>) -> StoreResult<Vec<Field>> {
        let mut fields = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(field) = self.get_field(*id)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    fn select_fields_by_table(&self, table_id: TableId) -> StoreResult<Vec<Field>> {
        self.fields_for_table(table_id)
    }

    fn select_child_field_ids(&self, parent_id: FieldId) -> StoreResult<Vec<FieldId>> {
        self.child_field_ids(parent_id)
    }

    fn select_field_values_by_field_ids(
        &self,
        ids: &BTreeSet<FieldId>,
    ) -> StoreResult<Vec<FieldValues>> {
        let mut values = Vec::new();
        for id in ids {
            values.extend(self.field_values_for(*id)?);
        }
        Ok(values)
    }

    fn select_table(&self, id: TableId) -> StoreResult<Option<Table>> {
        self.get_table(id)
    }

    fn delete_field(&self, id: FieldId) -> StoreResult<bool> {
        self.delete_field_record(id)
    }

    fn cascade_delete_children(&self, field_id: FieldId) -> StoreResult<()> {
        for child_id in self.child_field_ids(field_id)? {
            self.delete_field_record(child_id)?;
        }
        Ok(())
    }

    fn cascade_delete_values(&self, field_id: FieldId) -> StoreResult<()> {
        self.delete_field_values_for(field_id).map(|_| ())
    }

    fn cascade_delete_cross_refs(&self, field_id: FieldId) -> StoreResult<()> {
        self.delete_important_fields_for(field_id).map(|_| ())
    }
}

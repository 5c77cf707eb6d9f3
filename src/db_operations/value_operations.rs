use chrono::Utc;
use serde_json::Value;

use super::core::{composite_key, DbOperations};
use crate::error::StoreResult;
use crate::field::model::{FieldId, FieldValues, ImportantFieldRef};

impl DbOperations {
    /// Stores a value dictionary for a field
    pub fn insert_field_values(
        &self,
        field_id: FieldId,
        values: Vec<Value>,
        human_readable_values: Vec<String>,
    ) -> StoreResult<FieldValues> {
        let now = Utc::now();
        let record = FieldValues {
            id: self.next_id()?,
            field_id,
            values,
            human_readable_values,
            created_at: now,
            updated_at: now,
        };
        self.store_in_tree(
            &self.field_values_tree,
            composite_key(field_id, record.id),
            &record,
        )?;
        Ok(record)
    }

    pub fn field_values_for(&self, field_id: FieldId) -> StoreResult<Vec<FieldValues>> {
        self.scan_values(&self.field_values_tree, &field_id.to_be_bytes())
    }

    pub(crate) fn delete_field_values_for(&self, field_id: FieldId) -> StoreResult<usize> {
        self.remove_prefix(&self.field_values_tree, field_id)
    }

    /// Records that `field_id` is important for `metric_id`
    pub fn insert_important_field(
        &self,
        metric_id: u64,
        field_id: FieldId,
    ) -> StoreResult<ImportantFieldRef> {
        let record = ImportantFieldRef {
            id: self.next_id()?,
            metric_id,
            field_id,
        };
        self.store_in_tree(
            &self.important_fields_tree,
            composite_key(field_id, record.id),
            &record,
        )?;
        Ok(record)
    }

    pub fn important_fields_for(&self, field_id: FieldId) -> StoreResult<Vec<ImportantFieldRef>> {
        self.scan_values(&self.important_fields_tree, &field_id.to_be_bytes())
    }

    pub(crate) fn delete_important_fields_for(&self, field_id: FieldId) -> StoreResult<usize> {
        self.remove_prefix(&self.important_fields_tree, field_id)
    }
}

use chrono::Utc;

use super::core::{composite_key, id_key, DbOperations, FIELDS_TREE, INDEX_MARKER};
use crate::error::{StoreError, StoreResult};
use crate::field::model::{Field, FieldId, FieldUpdate, NewField, TableId};
use crate::{log_database_debug, log_database_warn};

impl DbOperations {
    /// Stores a new field and its index entries
    pub(crate) fn insert_field_record(&self, new_field: NewField) -> StoreResult<FieldId> {
        let id = self.next_id()?;
        let field = new_field.into_field(id, Utc::now());

        self.store_in_tree(&self.fields_tree, id_key(id), &field)?;
        self.table_fields_tree
            .insert(composite_key(field.table_id, id), INDEX_MARKER)?;
        if let Some(parent_id) = field.parent_id {
            self.field_children_tree
                .insert(composite_key(parent_id, id), INDEX_MARKER)?;
        }

        log_database_debug!(
            "Inserted field {} '{}' in table {}",
            id,
            field.name,
            field.table_id
        );
        Ok(id)
    }

    /// Applies a partial update, keeping the parent index in step
    pub(crate) fn update_field_record(&self, id: FieldId, changes: &FieldUpdate) -> StoreResult<()> {
        let mut field = self
            .get_field(id)?
            .ok_or(StoreError::MissingRecord {
                tree: FIELDS_TREE,
                id,
            })?;
        let previous_parent = field.parent_id;

        changes.apply_to(&mut field);
        field.updated_at = Utc::now();
        self.store_in_tree(&self.fields_tree, id_key(id), &field)?;

        if previous_parent != field.parent_id {
            if let Some(old_parent) = previous_parent {
                self.field_children_tree.remove(composite_key(old_parent, id))?;
            }
            if let Some(new_parent) = field.parent_id {
                self.field_children_tree
                    .insert(composite_key(new_parent, id), INDEX_MARKER)?;
            }
        }

        log_database_debug!("Updated field {} with {:?}", id, changes);
        Ok(())
    }

    /// Gets a field by id
    pub fn get_field(&self, id: FieldId) -> StoreResult<Option<Field>> {
        self.get_from_tree(&self.fields_tree, id_key(id))
    }

    /// Lists every field of a table in id order
    pub fn fields_for_table(&self, table_id: TableId) -> StoreResult<Vec<Field>> {
        let ids = self.scan_index(&self.table_fields_tree, "table_fields", table_id)?;
        let mut fields = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_field(id)? {
                Some(field) => fields.push(field),
                None => log_database_warn!("Table {} index points at missing field {}", table_id, id),
            }
        }
        Ok(fields)
    }

    /// Ids of the direct children of a field
    pub fn child_field_ids(&self, parent_id: FieldId) -> StoreResult<Vec<FieldId>> {
        self.scan_index(&self.field_children_tree, "field_children", parent_id)
    }

    /// Removes a field row and its own index entries. Dependent records are
    /// left alone; see [`crate::field::lifecycle::delete_field`].
    pub(crate) fn delete_field_record(&self, id: FieldId) -> StoreResult<bool> {
        let Some(field) = self.get_field(id)? else {
            return Ok(false);
        };

        self.table_fields_tree
            .remove(composite_key(field.table_id, id))?;
        if let Some(parent_id) = field.parent_id {
            self.field_children_tree.remove(composite_key(parent_id, id))?;
        }
        let existed = self.delete_from_tree(&self.fields_tree, id_key(id))?;

        log_database_debug!("Deleted field {} '{}'", id, field.name);
        Ok(existed)
    }
}

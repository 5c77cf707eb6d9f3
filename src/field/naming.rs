//! Dotted `schema.table.parent.field` names.

use std::collections::HashSet;

use crate::db_operations::MetadataStore;
use crate::error::{CatalogError, CatalogResult};
use crate::field::model::{Field, FieldId};
use crate::log_naming_debug;

/// Path segments from the schema (when the table has one) down to `field`.
///
/// A `parent_id` that does not resolve is treated as if the field were a
/// root field, and a missing table contributes no segments. A parent chain
/// that loops back on itself is a [`CatalogError::Structural`] error.
pub fn qualified_name_components<S: MetadataStore + ?Sized>(
    store: &S,
    field: &Field,
) -> CatalogResult<Vec<String>> {
    let mut names = vec![field.name.clone()];
    let mut visited: HashSet<FieldId> = HashSet::from([field.id]);
    let mut root_table = field.table_id;
    let mut next_parent = field.parent_id;

    while let Some(parent_id) = next_parent {
        if !visited.insert(parent_id) {
            return Err(CatalogError::structural(format!(
                "Parent chain of field {} loops through field {}",
                field.id, parent_id
            )));
        }
        let Some(parent) = store.select_field(parent_id)? else {
            log_naming_debug!(
                "Parent {} of field {} not found, treating as root",
                parent_id,
                field.id
            );
            break;
        };
        names.push(parent.name);
        root_table = parent.table_id;
        next_parent = parent.parent_id;
    }

    if let Some(table) = store.select_table(root_table)? {
        names.push(table.name);
        if let Some(schema) = table.schema {
            names.push(schema);
        }
    }

    names.reverse();
    Ok(names)
}

/// [`qualified_name_components`] joined with `.`.
pub fn qualified_name<S: MetadataStore + ?Sized>(store: &S, field: &Field) -> CatalogResult<String> {
    Ok(qualified_name_components(store, field)?.join("."))
}

//! Validation hooks run around field persistence, and cascade delete.

use std::collections::HashSet;

use crate::db_operations::MetadataStore;
use crate::error::{CatalogError, CatalogResult};
use crate::field::model::{Field, FieldId, FieldUpdate, NewField};
use crate::field::types::{is_valid, valid_base_types, BaseType, SpecialType, VisibilityType};
use crate::humanize::Humanize;
use crate::{log_database_debug, log_database_info};

/// Rejects a special type outside the taxonomy or incompatible with
/// `base_type`.
pub fn assert_valid_special_type(
    special_type: Option<SpecialType>,
    base_type: BaseType,
) -> CatalogResult<()> {
    let Some(special_type) = special_type else {
        return Ok(());
    };
    if !special_type.is_member() {
        return Err(CatalogError::validation(format!(
            "Invalid special type: {special_type}"
        )));
    }
    if !is_valid(special_type, base_type) {
        let allowed = valid_base_types(special_type)
            .unwrap_or_default()
            .iter()
            .map(BaseType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CatalogError::validation(format!(
            "Special type {special_type} is not valid for base type {base_type} (expected one of: {allowed})"
        )));
    }
    Ok(())
}

/// Validates a new field and fills in defaults before it is inserted.
pub fn pre_insert(field: &mut NewField, humanizer: &dyn Humanize) -> CatalogResult<()> {
    if field.table_id == 0 {
        return Err(CatalogError::validation("Field table_id must be positive"));
    }
    if field.name.is_empty() {
        return Err(CatalogError::validation("Field name cannot be empty"));
    }
    assert_valid_special_type(field.special_type, field.base_type)?;
    if field.fk_target_field_id.is_some() && field.special_type != Some(SpecialType::Fk) {
        return Err(CatalogError::validation(format!(
            "Field '{}' has an fk target but is not an fk field",
            field.name
        )));
    }

    if field.display_name.as_deref().map_or(true, str::is_empty) {
        field.display_name = Some(humanizer.humanize(&field.name));
    }
    field.visibility_type.get_or_insert(VisibilityType::Normal);
    Ok(())
}

/// Validates `changes` against the record they will produce.
///
/// Rejects invalid special types, a field targeting itself as fk, and a
/// parent assignment that would put the field inside its own subtree.
pub fn pre_update<S: MetadataStore + ?Sized>(
    store: &S,
    existing: &Field,
    changes: &FieldUpdate,
) -> CatalogResult<()> {
    let mut candidate = existing.clone();
    changes.apply_to(&mut candidate);

    assert_valid_special_type(candidate.special_type, candidate.base_type)?;

    if candidate.fk_target_field_id == Some(candidate.id) {
        return Err(CatalogError::validation(format!(
            "Field {} cannot reference itself as fk target",
            candidate.id
        )));
    }

    if let Some(Some(new_parent)) = changes.parent_id {
        if existing.parent_id != Some(new_parent) {
            ensure_not_descendant(store, candidate.id, new_parent)?;
        }
    }
    Ok(())
}

/// Fails if `parent_id` is `field_id` or one of its ancestors is.
fn ensure_not_descendant<S: MetadataStore + ?Sized>(
    store: &S,
    field_id: FieldId,
    parent_id: FieldId,
) -> CatalogResult<()> {
    let mut seen = HashSet::new();
    let mut current = Some(parent_id);
    while let Some(id) = current {
        if id == field_id {
            return Err(CatalogError::validation(format!(
                "Setting parent {parent_id} on field {field_id} would create a cycle"
            )));
        }
        if !seen.insert(id) {
            // Pre-existing cycle above the new parent; the reader reports it.
            break;
        }
        current = store.select_field(id)?.and_then(|f| f.parent_id);
    }
    Ok(())
}

/// Deletes a field together with everything that depends on it.
///
/// Nested fields are removed depth first, then for each field its value
/// dictionaries and important-field references, then the row itself. The
/// whole subtree is resolved before the first delete, so a cyclic child graph
/// fails with [`CatalogError::Structural`] without deleting anything.
/// Returns false if `field_id` did not exist.
pub fn delete_field<S: MetadataStore + ?Sized>(store: &S, field_id: FieldId) -> CatalogResult<bool> {
    if store.select_field(field_id)?.is_none() {
        return Ok(false);
    }

    let order = subtree_post_order(store, field_id)?;
    for id in &order {
        pre_delete(store, *id)?;
        store.delete_field(*id)?;
    }

    log_database_info!(
        "Deleted field {} and {} nested field(s)",
        field_id,
        order.len() - 1
    );
    Ok(true)
}

/// Removes the records that depend on a single field. Children must already
/// be gone; the sweep catches rows that escaped the subtree walk.
fn pre_delete<S: MetadataStore + ?Sized>(store: &S, field_id: FieldId) -> CatalogResult<()> {
    store.cascade_delete_children(field_id)?;
    store.cascade_delete_values(field_id)?;
    store.cascade_delete_cross_refs(field_id)?;
    log_database_debug!("Cascaded dependents of field {}", field_id);
    Ok(())
}

/// Ids of `root` and all its descendants, children before parents.
fn subtree_post_order<S: MetadataStore + ?Sized>(
    store: &S,
    root: FieldId,
) -> CatalogResult<Vec<FieldId>> {
    let mut order = Vec::new();
    let mut seen = HashSet::from([root]);
    // (field, children already pushed)
    let mut stack = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        stack.push((id, true));
        for child in store.select_child_field_ids(id)? {
            if !seen.insert(child) {
                return Err(CatalogError::structural(format!(
                    "Field {child} appears twice below field {root}; parent chain is cyclic"
                )));
            }
            stack.push((child, false));
        }
    }
    Ok(order)
}

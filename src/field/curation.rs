//! Manual edits to field metadata and foreign-key linking.

use chrono::Utc;

use crate::db_operations::MetadataStore;
use crate::error::{CatalogError, CatalogResult};
use crate::field::lifecycle::pre_update;
use crate::field::model::{Field, FieldId, FieldUpdate};
use crate::field::types::{SpecialType, VisibilityType};
use crate::log_sync_info;

/// Attributes a user may change on a field. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldEdit {
    pub display_name: Option<String>,
    pub description: Option<Option<String>>,
    pub special_type: Option<Option<SpecialType>>,
    pub visibility_type: Option<VisibilityType>,
    pub fk_target_field_id: Option<Option<FieldId>>,
}

/// Applies a user edit. Only attributes that differ from the stored record
/// are written; an edit that changes nothing issues no write.
pub fn apply_edit<S: MetadataStore + ?Sized>(
    store: &S,
    field_id: FieldId,
    edit: &FieldEdit,
) -> CatalogResult<Field> {
    let existing = store
        .select_field(field_id)?
        .ok_or_else(|| CatalogError::not_found(format!("Field {field_id}")))?;

    if let Some(visibility) = edit.visibility_type {
        if !visibility.is_user_settable() {
            return Err(CatalogError::validation(format!(
                "Visibility '{visibility}' is managed by schema sync and cannot be set manually"
            )));
        }
    }
    if matches!(edit.display_name.as_deref(), Some("")) {
        return Err(CatalogError::validation("Display name cannot be empty"));
    }

    let changes = FieldUpdate {
        display_name: edit
            .display_name
            .clone()
            .filter(|name| *name != existing.display_name),
        description: edit
            .description
            .clone()
            .filter(|description| *description != existing.description),
        special_type: edit.special_type.filter(|st| *st != existing.special_type),
        visibility_type: edit
            .visibility_type
            .filter(|visibility| *visibility != existing.visibility_type),
        fk_target_field_id: edit
            .fk_target_field_id
            .filter(|target| *target != existing.fk_target_field_id),
        ..Default::default()
    };

    let mut candidate = existing.clone();
    changes.apply_to(&mut candidate);
    check_fk_target(store, &candidate)?;
    pre_update(store, &existing, &changes)?;

    if changes.is_empty() {
        return Ok(existing);
    }
    store.update_field(field_id, &changes)?;
    log_sync_info!("Edited field {} '{}': {:?}", field_id, existing.name, changes);

    candidate.updated_at = Utc::now();
    Ok(candidate)
}

/// Marks `field_id` as a foreign key to `target_id` in a single write.
pub fn link_foreign_key<S: MetadataStore + ?Sized>(
    store: &S,
    field_id: FieldId,
    target_id: FieldId,
) -> CatalogResult<Field> {
    if field_id == target_id {
        return Err(CatalogError::validation(format!(
            "Field {field_id} cannot reference itself as fk target"
        )));
    }
    let existing = store
        .select_field(field_id)?
        .ok_or_else(|| CatalogError::not_found(format!("Field {field_id}")))?;
    if store.select_field(target_id)?.is_none() {
        return Err(CatalogError::not_found(format!("fk target field {target_id}")));
    }

    if existing.special_type == Some(SpecialType::Fk)
        && existing.fk_target_field_id == Some(target_id)
    {
        return Ok(existing);
    }

    let changes = FieldUpdate {
        special_type: Some(Some(SpecialType::Fk)),
        fk_target_field_id: Some(Some(target_id)),
        ..Default::default()
    };
    pre_update(store, &existing, &changes)?;
    store.update_field(field_id, &changes)?;
    log_sync_info!("Linked field {} -> {}", field_id, target_id);

    let mut linked = existing;
    changes.apply_to(&mut linked);
    linked.updated_at = Utc::now();
    Ok(linked)
}

/// A target is only allowed on fk fields, and must exist.
fn check_fk_target<S: MetadataStore + ?Sized>(store: &S, candidate: &Field) -> CatalogResult<()> {
    let Some(target_id) = candidate.fk_target_field_id else {
        return Ok(());
    };
    if !candidate.is_fk() {
        return Err(CatalogError::validation(format!(
            "Field {} has an fk target but special type {:?}",
            candidate.id, candidate.special_type
        )));
    }
    if target_id != candidate.id && store.select_field(target_id)?.is_none() {
        return Err(CatalogError::not_found(format!("fk target field {target_id}")));
    }
    Ok(())
}

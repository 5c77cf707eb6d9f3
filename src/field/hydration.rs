//! Batched loading of records associated with a collection of fields.
//!
//! Each loader issues at most one store query for the whole collection, no
//! matter how many fields it is given, and returns exactly one record per
//! input field in input order.

use std::collections::{BTreeSet, HashMap};

use crate::db_operations::MetadataStore;
use crate::error::CatalogResult;
use crate::field::model::{Field, FieldId, FieldValues};
use crate::log_hydration_debug;

/// A field with its associated records attached.
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedField {
    pub field: Field,
    /// Value dictionaries; empty until [`attach_values`] runs, and empty when
    /// the field has none.
    pub values: Vec<FieldValues>,
    /// Foreign-key target, set by [`attach_targets`] for fk fields whose
    /// target exists.
    pub target: Option<Field>,
}

impl From<Field> for HydratedField {
    fn from(field: Field) -> Self {
        Self {
            field,
            values: Vec::new(),
            target: None,
        }
    }
}

/// Attaches value dictionaries to every field with a single lookup.
pub fn attach_values<S: MetadataStore + ?Sized>(
    store: &S,
    fields: Vec<HydratedField>,
) -> CatalogResult<Vec<HydratedField>> {
    if fields.is_empty() {
        return Ok(fields);
    }

    let ids: BTreeSet<FieldId> = fields.iter().map(|h| h.field.id).collect();
    let rows = store.select_field_values_by_field_ids(&ids)?;
    log_hydration_debug!("Loaded {} value row(s) for {} field(s)", rows.len(), ids.len());

    let mut by_field: HashMap<FieldId, Vec<FieldValues>> = HashMap::new();
    for row in rows {
        by_field.entry(row.field_id).or_default().push(row);
    }

    Ok(fields
        .into_iter()
        .map(|mut hydrated| {
            // Duplicate input ids each get their own copy.
            hydrated.values = by_field.get(&hydrated.field.id).cloned().unwrap_or_default();
            hydrated
        })
        .collect())
}

/// Attaches the fk target of every fk field with a single lookup.
pub fn attach_targets<S: MetadataStore + ?Sized>(
    store: &S,
    fields: Vec<HydratedField>,
) -> CatalogResult<Vec<HydratedField>> {
    let target_ids: BTreeSet<FieldId> = fields.iter().filter_map(|h| h.field.fk_target()).collect();
    if target_ids.is_empty() {
        return Ok(fields
            .into_iter()
            .map(|mut hydrated| {
                hydrated.target = None;
                hydrated
            })
            .collect());
    }

    let targets: HashMap<FieldId, Field> = store
        .select_fields_by_ids(&target_ids)?
        .into_iter()
        .map(|target| (target.id, target))
        .collect();
    log_hydration_debug!(
        "Resolved {} of {} fk target(s)",
        targets.len(),
        target_ids.len()
    );

    Ok(fields
        .into_iter()
        .map(|mut hydrated| {
            hydrated.target = hydrated
                .field
                .fk_target()
                .and_then(|target_id| targets.get(&target_id).cloned());
            hydrated
        })
        .collect())
}

/// Wraps plain fields and runs both loaders.
pub fn hydrate<S: MetadataStore + ?Sized>(
    store: &S,
    fields: Vec<Field>,
) -> CatalogResult<Vec<HydratedField>> {
    let hydrated = fields.into_iter().map(HydratedField::from).collect();
    attach_targets(store, attach_values(store, hydrated)?)
}

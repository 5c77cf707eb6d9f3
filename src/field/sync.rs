//! Reconciles columns reported by schema discovery with stored field
//! metadata.
//!
//! Discovery runs repeatedly over large catalogs and mostly re-confirms what
//! is already stored, so the update path only writes when one of the
//! sync-owned attributes (`display_name`, `base_type`, `special_type`,
//! `parent_id`) actually changes.

use chrono::Utc;
use std::collections::{HashMap, HashSet};

use crate::db_operations::MetadataStore;
use crate::error::{CatalogError, CatalogResult};
use crate::field::classifier::infer_special_type;
use crate::field::lifecycle::{pre_insert, pre_update};
use crate::field::model::{Field, FieldDescriptor, FieldId, FieldUpdate, NewField, TableId};
use crate::field::types::{SpecialType, VisibilityType};
use crate::humanize::Humanize;
use crate::logging::features::{LogFeature, PerformanceTimer};
use crate::{log_sync_debug, log_sync_info, log_sync_warn};

/// Outcome of syncing one table.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub table_id: TableId,
    pub created: Vec<FieldId>,
    pub updated: Vec<FieldId>,
    pub unchanged: Vec<FieldId>,
    pub retired: Vec<FieldId>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Number of writes issued.
    pub fn writes(&self) -> usize {
        self.created.len() + self.updated.len() + self.retired.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A descriptor that could not be reconciled.
#[derive(Debug)]
pub struct SyncFailure {
    pub name: String,
    pub parent_id: Option<FieldId>,
    pub error: CatalogError,
}

/// Create/update entry points used by schema discovery.
pub struct FieldSync<'a, S: MetadataStore + ?Sized> {
    store: &'a S,
    humanizer: &'a dyn Humanize,
}

impl<'a, S: MetadataStore + ?Sized> FieldSync<'a, S> {
    pub fn new(store: &'a S, humanizer: &'a dyn Humanize) -> Self {
        Self { store, humanizer }
    }

    /// Persists a newly discovered column.
    ///
    /// Special type precedence: explicit hint, then `id` for primary keys,
    /// then name-based inference.
    pub fn create(&self, table_id: TableId, descriptor: &FieldDescriptor) -> CatalogResult<Field> {
        if table_id == 0 {
            return Err(CatalogError::validation("table_id must be positive"));
        }
        if descriptor.name.is_empty() {
            return Err(CatalogError::validation("Field name cannot be empty"));
        }

        let special_type = descriptor
            .special_type
            .or_else(|| descriptor.pk.then_some(SpecialType::Id))
            .or_else(|| infer_special_type(&descriptor.name, descriptor.base_type));

        let mut new_field = NewField {
            special_type,
            parent_id: descriptor.parent_id,
            raw_column_id: descriptor.raw_column_id,
            ..NewField::new(table_id, descriptor.name.clone(), descriptor.base_type)
        };
        pre_insert(&mut new_field, self.humanizer)?;

        let id = self.store.insert_field(new_field)?;
        log_sync_info!(
            "Created field {} '{}' in table {} as {:?}",
            id,
            descriptor.name,
            table_id,
            special_type
        );
        self.store
            .select_field(id)?
            .ok_or_else(|| CatalogError::not_found(format!("Field {id} vanished after insert")))
    }

    /// Reconciles a stored field with its freshly discovered descriptor.
    ///
    /// An already set special type is never replaced. Writes only when the
    /// resolved candidate differs from `existing`.
    pub fn update(&self, existing: &Field, descriptor: &FieldDescriptor) -> CatalogResult<Field> {
        self.reconcile(existing, descriptor).map(|(field, _)| field)
    }

    /// The resolved candidate for `existing`, without writing it.
    pub fn resolve_candidate(&self, existing: &Field, descriptor: &FieldDescriptor) -> Field {
        let special_type = existing
            .special_type
            .or(descriptor.special_type)
            .or_else(|| descriptor.pk.then_some(SpecialType::Id))
            .or_else(|| infer_special_type(&descriptor.name, descriptor.base_type));

        let display_name = if existing.display_name.is_empty() {
            self.humanizer.humanize(&descriptor.name)
        } else {
            existing.display_name.clone()
        };

        Field {
            display_name,
            base_type: descriptor.base_type,
            special_type,
            parent_id: descriptor.parent_id,
            ..existing.clone()
        }
    }

    /// Returns the reconciled field and whether a write was issued.
    fn reconcile(&self, existing: &Field, descriptor: &FieldDescriptor) -> CatalogResult<(Field, bool)> {
        let mut candidate = self.resolve_candidate(existing, descriptor);
        let changes = FieldUpdate::sync_attributes(&candidate);
        pre_update(self.store, existing, &changes)?;

        if sync_attributes_equal(existing, &candidate) {
            log_sync_debug!("Field {} '{}' unchanged", existing.id, existing.name);
            return Ok((existing.clone(), false));
        }

        self.store.update_field(existing.id, &changes)?;
        candidate.updated_at = Utc::now();
        log_sync_info!(
            "Updated field {} '{}': base {} -> {}, special {:?} -> {:?}",
            existing.id,
            existing.name,
            existing.base_type,
            candidate.base_type,
            existing.special_type,
            candidate.special_type
        );
        Ok((candidate, true))
    }

    /// Marks a field whose column disappeared from the source.
    pub fn retire(&self, field: &Field) -> CatalogResult<Field> {
        let changes = FieldUpdate {
            visibility_type: Some(VisibilityType::Retired),
            ..Default::default()
        };
        self.store.update_field(field.id, &changes)?;
        log_sync_info!("Retired field {} '{}'", field.id, field.name);

        let mut retired = field.clone();
        retired.visibility_type = VisibilityType::Retired;
        retired.updated_at = Utc::now();
        Ok(retired)
    }

    /// Syncs a whole table: updates matching fields, creates new ones and
    /// retires stored fields that were not reported.
    ///
    /// Fields are matched on `(name, parent_id)`. A failing descriptor is
    /// recorded in the report and does not stop the others; store errors on
    /// the initial load and on retirement abort the call.
    pub fn sync_table(
        &self,
        table_id: TableId,
        descriptors: &[FieldDescriptor],
    ) -> CatalogResult<SyncReport> {
        let timer = PerformanceTimer::new(LogFeature::Sync, format!("sync table {table_id}"));
        let existing = self.store.select_fields_by_table(table_id)?;
        let mut by_key: HashMap<(String, Option<FieldId>), Field> = existing
            .into_iter()
            .map(|field| ((field.name.clone(), field.parent_id), field))
            .collect();

        let mut report = SyncReport {
            table_id,
            ..Default::default()
        };
        let mut reported: HashSet<(String, Option<FieldId>)> = HashSet::new();

        for descriptor in descriptors {
            let key = (descriptor.name.clone(), descriptor.parent_id);
            if !reported.insert(key.clone()) {
                report.failures.push(SyncFailure {
                    name: descriptor.name.clone(),
                    parent_id: descriptor.parent_id,
                    error: CatalogError::validation(format!(
                        "Column '{}' reported more than once",
                        descriptor.name
                    )),
                });
                continue;
            }

            let outcome = match by_key.get(&key) {
                Some(field) => self.sync_existing(field, descriptor).map(|(field, written)| {
                    if written {
                        report.updated.push(field.id);
                    } else {
                        report.unchanged.push(field.id);
                    }
                }),
                None => self
                    .create(table_id, descriptor)
                    .map(|field| report.created.push(field.id)),
            };

            if let Err(error) = outcome {
                log_sync_warn!(
                    "Failed to sync column '{}' of table {}: {}",
                    descriptor.name,
                    table_id,
                    error
                );
                report.failures.push(SyncFailure {
                    name: descriptor.name.clone(),
                    parent_id: descriptor.parent_id,
                    error,
                });
            }
        }

        by_key.retain(|key, field| {
            !reported.contains(key) && field.visibility_type != VisibilityType::Retired
        });
        let mut vanished: Vec<Field> = by_key.into_values().collect();
        vanished.sort_by_key(|field| field.id);
        for field in vanished {
            report.retired.push(self.retire(&field)?.id);
        }

        log_sync_info!(
            "Synced table {}: {} created, {} updated, {} unchanged, {} retired, {} failed",
            table_id,
            report.created.len(),
            report.updated.len(),
            report.unchanged.len(),
            report.retired.len(),
            report.failures.len()
        );
        timer.finish();
        Ok(report)
    }

    /// Update path for a matched field; a retired field that reappears is
    /// restored to normal visibility first.
    fn sync_existing(&self, field: &Field, descriptor: &FieldDescriptor) -> CatalogResult<(Field, bool)> {
        if field.visibility_type != VisibilityType::Retired {
            return self.reconcile(field, descriptor);
        }

        let restored_candidate = self.resolve_candidate(field, descriptor);
        pre_update(self.store, field, &FieldUpdate::sync_attributes(&restored_candidate))?;

        self.store.update_field(
            field.id,
            &FieldUpdate {
                visibility_type: Some(VisibilityType::Normal),
                ..Default::default()
            },
        )?;
        log_sync_info!("Restored retired field {} '{}'", field.id, field.name);

        let mut restored = field.clone();
        restored.visibility_type = VisibilityType::Normal;
        let (reconciled, _) = self.reconcile(&restored, descriptor)?;
        Ok((reconciled, true))
    }
}

/// Equality over the attributes schema sync owns.
pub fn sync_attributes_equal(a: &Field, b: &Field) -> bool {
    a.display_name == b.display_name
        && a.base_type == b.base_type
        && a.special_type == b.special_type
        && a.parent_id == b.parent_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_operations::DbOperations;
    use crate::field::types::BaseType;
    use crate::humanize::DefaultHumanizer;

    #[test]
    fn test_resolve_candidate_keeps_existing_special_type() {
        let db_ops = DbOperations::temporary().unwrap();
        let sync = FieldSync::new(&db_ops, &DefaultHumanizer);
        let existing = sync
            .create(1, &FieldDescriptor::new("status", BaseType::CharField))
            .unwrap();
        assert_eq!(existing.special_type, Some(SpecialType::Category));

        let hinted = FieldDescriptor::new("status", BaseType::CharField).with_special_type(SpecialType::Name);
        let candidate = sync.resolve_candidate(&existing, &hinted);
        assert_eq!(candidate.special_type, Some(SpecialType::Category));
        assert!(sync_attributes_equal(&existing, &candidate));
    }

    #[test]
    fn test_resolve_candidate_fills_blank_display_name() {
        let db_ops = DbOperations::temporary().unwrap();
        let sync = FieldSync::new(&db_ops, &DefaultHumanizer);
        let mut existing = sync
            .create(1, &FieldDescriptor::new("last_name", BaseType::TextField))
            .unwrap();
        existing.display_name.clear();

        let candidate = sync.resolve_candidate(&existing, &FieldDescriptor::new("last_name", BaseType::TextField));
        assert_eq!(candidate.display_name, "Last Name");
        assert!(!sync_attributes_equal(&existing, &candidate));
    }
}

//! Entry point tying the metadata store to the field operations.

use crate::config::CatalogConfig;
use crate::db_operations::{DbOperations, MetadataStore};
use crate::error::{CatalogError, CatalogResult};
use crate::field::classifier::verify_rule_table;
use crate::field::curation::{self, FieldEdit};
use crate::field::hydration::{self, HydratedField};
use crate::field::lifecycle;
use crate::field::model::{Field, FieldDescriptor, FieldId, TableId};
use crate::field::naming;
use crate::field::sync::{FieldSync, SyncReport};
use crate::humanize::{verify_name_patterns, DefaultHumanizer, Humanize};
use crate::log_database_info;

/// Field metadata catalog backed by a sled database.
///
/// ```no_run
/// use field_catalog::{BaseType, CatalogConfig, FieldCatalog, FieldDescriptor};
///
/// let catalog = FieldCatalog::open(&CatalogConfig::default())?;
/// let table = catalog.store().insert_table("people", Some("public"))?;
/// let field = catalog.create_field(table.id, &FieldDescriptor::new("user_lat", BaseType::FloatField))?;
/// assert_eq!(catalog.qualified_name(field.id)?, "public.people.user_lat");
/// # Ok::<(), field_catalog::CatalogError>(())
/// ```
pub struct FieldCatalog {
    db_ops: DbOperations,
    humanizer: Box<dyn Humanize>,
}

impl FieldCatalog {
    /// Opens the database at `config.storage_path`.
    pub fn open(config: &CatalogConfig) -> CatalogResult<Self> {
        let db_ops = DbOperations::open(config)?;
        Self::new(db_ops)
    }

    /// Wraps an already opened store. Fails if the classification rules or
    /// the display name patterns do not compile.
    pub fn new(db_ops: DbOperations) -> CatalogResult<Self> {
        verify_rule_table()?;
        verify_name_patterns()?;
        log_database_info!("Field catalog ready: {:?}", db_ops.get_stats());
        Ok(Self {
            db_ops,
            humanizer: Box::new(DefaultHumanizer),
        })
    }

    /// Replaces the display name generator.
    pub fn with_humanizer(mut self, humanizer: impl Humanize + 'static) -> Self {
        self.humanizer = Box::new(humanizer);
        self
    }

    pub fn store(&self) -> &DbOperations {
        &self.db_ops
    }

    fn sync(&self) -> FieldSync<'_, DbOperations> {
        FieldSync::new(&self.db_ops, self.humanizer.as_ref())
    }

    fn require_field(&self, field_id: FieldId) -> CatalogResult<Field> {
        self.db_ops
            .select_field(field_id)?
            .ok_or_else(|| CatalogError::not_found(format!("Field {field_id}")))
    }

    pub fn create_field(&self, table_id: TableId, descriptor: &FieldDescriptor) -> CatalogResult<Field> {
        self.sync().create(table_id, descriptor)
    }

    /// Reconciles the stored field `field_id` with `descriptor`.
    pub fn update_field(&self, field_id: FieldId, descriptor: &FieldDescriptor) -> CatalogResult<Field> {
        let existing = self.require_field(field_id)?;
        self.sync().update(&existing, descriptor)
    }

    pub fn sync_table(&self, table_id: TableId, descriptors: &[FieldDescriptor]) -> CatalogResult<SyncReport> {
        self.sync().sync_table(table_id, descriptors)
    }

    pub fn apply_edit(&self, field_id: FieldId, edit: &FieldEdit) -> CatalogResult<Field> {
        curation::apply_edit(&self.db_ops, field_id, edit)
    }

    pub fn link_foreign_key(&self, field_id: FieldId, target_id: FieldId) -> CatalogResult<Field> {
        curation::link_foreign_key(&self.db_ops, field_id, target_id)
    }

    /// Deletes a field with its nested fields, values and cross-references.
    /// Returns `false` when the field did not exist.
    pub fn delete_field(&self, field_id: FieldId) -> CatalogResult<bool> {
        lifecycle::delete_field(&self.db_ops, field_id)
    }

    pub fn field(&self, field_id: FieldId) -> CatalogResult<Option<Field>> {
        Ok(self.db_ops.select_field(field_id)?)
    }

    pub fn fields_for_table(&self, table_id: TableId) -> CatalogResult<Vec<Field>> {
        Ok(self.db_ops.select_fields_by_table(table_id)?)
    }

    /// Loads values and fk targets for `fields` with one query each.
    pub fn hydrate(&self, fields: Vec<Field>) -> CatalogResult<Vec<HydratedField>> {
        hydration::hydrate(&self.db_ops, fields)
    }

    pub fn qualified_name(&self, field_id: FieldId) -> CatalogResult<String> {
        let field = self.require_field(field_id)?;
        naming::qualified_name(&self.db_ops, &field)
    }
}

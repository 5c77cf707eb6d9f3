//! Persisted records: fields, tables, value dictionaries and the discovery
//! descriptors that feed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::field::types::{BaseType, SpecialType, VisibilityType};

pub type FieldId = u64;
pub type TableId = u64;

/// A column of a table, or a nested key of a composite column when
/// `parent_id` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub display_name: String,
    pub table_id: TableId,
    pub parent_id: Option<FieldId>,
    pub base_type: BaseType,
    pub special_type: Option<SpecialType>,
    #[serde(default)]
    pub visibility_type: VisibilityType,
    pub fk_target_field_id: Option<FieldId>,
    pub description: Option<String>,
    pub raw_column_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Field {
    pub fn is_fk(&self) -> bool {
        self.special_type == Some(SpecialType::Fk)
    }

    /// Target id if this is a foreign key with a target set.
    pub fn fk_target(&self) -> Option<FieldId> {
        if self.is_fk() {
            self.fk_target_field_id
        } else {
            None
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether a value dictionary should be kept for this field: queryable
    /// category or boolean fields.
    pub fn should_have_field_values(&self) -> bool {
        self.visibility_type.is_queryable()
            && (self.special_type == Some(SpecialType::Category)
                || self.base_type == BaseType::BooleanField)
    }
}

/// Attributes of a field that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewField {
    pub name: String,
    pub display_name: Option<String>,
    pub table_id: TableId,
    pub parent_id: Option<FieldId>,
    pub base_type: BaseType,
    pub special_type: Option<SpecialType>,
    pub visibility_type: Option<VisibilityType>,
    pub fk_target_field_id: Option<FieldId>,
    pub description: Option<String>,
    pub raw_column_id: Option<u64>,
}

impl NewField {
    pub fn new(table_id: TableId, name: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            table_id,
            parent_id: None,
            base_type,
            special_type: None,
            visibility_type: None,
            fk_target_field_id: None,
            description: None,
            raw_column_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: FieldId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_special_type(mut self, special_type: SpecialType) -> Self {
        self.special_type = Some(special_type);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_fk_target(mut self, target_id: FieldId) -> Self {
        self.fk_target_field_id = Some(target_id);
        self
    }

    /// Materializes the record the store will persist under `id`.
    pub fn into_field(self, id: FieldId, now: DateTime<Utc>) -> Field {
        Field {
            id,
            display_name: self.display_name.unwrap_or_default(),
            name: self.name,
            table_id: self.table_id,
            parent_id: self.parent_id,
            base_type: self.base_type,
            special_type: self.special_type,
            visibility_type: self.visibility_type.unwrap_or_default(),
            fk_target_field_id: self.fk_target_field_id,
            description: self.description,
            raw_column_id: self.raw_column_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a stored field. `None` leaves the attribute untouched;
/// for optional attributes `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub display_name: Option<String>,
    pub base_type: Option<BaseType>,
    pub special_type: Option<Option<SpecialType>>,
    pub parent_id: Option<Option<FieldId>>,
    pub visibility_type: Option<VisibilityType>,
    pub fk_target_field_id: Option<Option<FieldId>>,
    pub description: Option<Option<String>>,
}

impl FieldUpdate {
    /// The four attributes owned by schema sync.
    pub fn sync_attributes(candidate: &Field) -> Self {
        Self {
            display_name: Some(candidate.display_name.clone()),
            base_type: Some(candidate.base_type),
            special_type: Some(candidate.special_type),
            parent_id: Some(candidate.parent_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the update to an in-memory record. Does not touch timestamps.
    pub fn apply_to(&self, field: &mut Field) {
        if let Some(display_name) = &self.display_name {
            field.display_name = display_name.clone();
        }
        if let Some(base_type) = self.base_type {
            field.base_type = base_type;
        }
        if let Some(special_type) = self.special_type {
            field.special_type = special_type;
        }
        if let Some(parent_id) = self.parent_id {
            field.parent_id = parent_id;
        }
        if let Some(visibility_type) = self.visibility_type {
            field.visibility_type = visibility_type;
        }
        if let Some(target) = self.fk_target_field_id {
            field.fk_target_field_id = target;
        }
        if let Some(description) = &self.description {
            field.description = description.clone();
        }
    }
}

/// Owner of fields. Consumed, not managed, by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub schema: Option<String>,
}

/// Distinct values observed for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValues {
    pub id: u64,
    pub field_id: FieldId,
    pub values: Vec<Value>,
    #[serde(default)]
    pub human_readable_values: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Marks a field as important for a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantFieldRef {
    pub id: u64,
    pub metric_id: u64,
    pub field_id: FieldId,
}

/// A column as reported by schema discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub special_type: Option<SpecialType>,
    #[serde(default, rename = "pk?", alias = "pk")]
    pub pk: bool,
    #[serde(default)]
    pub parent_id: Option<FieldId>,
    #[serde(default)]
    pub raw_column_id: Option<u64>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            name: name.into(),
            base_type,
            special_type: None,
            pk: false,
            parent_id: None,
            raw_column_id: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.pk = true;
        self
    }

    pub fn with_special_type(mut self, special_type: SpecialType) -> Self {
        self.special_type = Some(special_type);
        self
    }

    pub fn with_parent(mut self, parent_id: FieldId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_raw_column(mut self, raw_column_id: u64) -> Self {
        self.raw_column_id = Some(raw_column_id);
        self
    }

    /// Parses a descriptor emitted by a discovery process. Unknown base or
    /// special types are validation errors.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::validation(format!("Invalid field descriptor: {e}")))
    }
}

//! Field metadata: the semantic type taxonomy, name-based classification,
//! lifecycle hooks, schema sync, curation, hydration and naming.

pub mod classifier;
pub mod curation;
pub mod hydration;
pub mod lifecycle;
pub mod model;
pub mod naming;
pub mod sync;
pub mod types;

pub use classifier::{infer_special_type, infer_special_type_raw, verify_rule_table};
pub use curation::{apply_edit, link_foreign_key, FieldEdit};
pub use hydration::{attach_targets, attach_values, hydrate, HydratedField};
pub use lifecycle::{assert_valid_special_type, delete_field, pre_insert, pre_update};
pub use model::{
    Field, FieldDescriptor, FieldId, FieldUpdate, FieldValues, ImportantFieldRef, NewField, Table,
    TableId,
};
pub use naming::{qualified_name, qualified_name_components};
pub use sync::{sync_attributes_equal, FieldSync, SyncFailure, SyncReport};
pub use types::{is_valid, valid_base_types, BaseType, SpecialType, VisibilityType};

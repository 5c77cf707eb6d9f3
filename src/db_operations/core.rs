use crate::config::CatalogConfig;
use crate::error::{StoreError, StoreResult};
use crate::log_database_info;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

pub(crate) const FIELDS_TREE: &str = "fields";
pub(crate) const TABLES_TREE: &str = "tables";
pub(crate) const FIELD_VALUES_TREE: &str = "field_values";
pub(crate) const IMPORTANT_FIELDS_TREE: &str = "important_fields";
pub(crate) const TABLE_FIELDS_TREE: &str = "table_fields";
pub(crate) const FIELD_CHILDREN_TREE: &str = "field_children";

/// Value stored under index keys; only the key carries information.
pub(crate) const INDEX_MARKER: &[u8] = &[];

/// Sled-backed metadata store.
///
/// Records are JSON encoded and keyed by big-endian ids so that iteration
/// order follows id order. Relations that are looked up by owner
/// (`table_fields`, `field_children`, and the per-field keys of
/// `field_values` and `important_fields`) use a composite `owner ++ id` key
/// and are read with a prefix scan.
#[derive(Clone)]
pub struct DbOperations {
    /// The underlying sled database instance
    db: sled::Db,
    pub(crate) fields_tree: sled::Tree,
    pub(crate) tables_tree: sled::Tree,
    pub(crate) field_values_tree: sled::Tree,
    pub(crate) important_fields_tree: sled::Tree,
    /// Index: table id ++ field id
    pub(crate) table_fields_tree: sled::Tree,
    /// Index: parent field id ++ child field id
    pub(crate) field_children_tree: sled::Tree,
}

impl DbOperations {
    /// Creates a new DbOperations instance with all required trees
    pub fn new(db: sled::Db) -> Result<Self, sled::Error> {
        let fields_tree = db.open_tree(FIELDS_TREE)?;
        let tables_tree = db.open_tree(TABLES_TREE)?;
        let field_values_tree = db.open_tree(FIELD_VALUES_TREE)?;
        let important_fields_tree = db.open_tree(IMPORTANT_FIELDS_TREE)?;
        let table_fields_tree = db.open_tree(TABLE_FIELDS_TREE)?;
        let field_children_tree = db.open_tree(FIELD_CHILDREN_TREE)?;

        Ok(Self {
            db,
            fields_tree,
            tables_tree,
            field_values_tree,
            important_fields_tree,
            table_fields_tree,
            field_children_tree,
        })
    }

    /// Opens the database described by `config`.
    pub fn open(config: &CatalogConfig) -> Result<Self, sled::Error> {
        let db = sled::Config::new()
            .path(&config.storage_path)
            .temporary(config.temporary)
            .open()?;
        log_database_info!(
            "Opened metadata store at {} (temporary: {})",
            config.storage_path.display(),
            config.temporary
        );
        Self::new(db)
    }

    /// Opens a throwaway in-memory-backed database.
    pub fn temporary() -> Result<Self, sled::Error> {
        Self::new(sled::Config::new().temporary(true).open()?)
    }

    /// Gets a reference to the underlying database
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Allocates a new record id. Ids start at 1.
    pub(crate) fn next_id(&self) -> StoreResult<u64> {
        Ok(self.db.generate_id()? + 1)
    }

    /// Gets database statistics
    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert(FIELDS_TREE.to_string(), self.fields_tree.len() as u64);
        stats.insert(TABLES_TREE.to_string(), self.tables_tree.len() as u64);
        stats.insert(
            FIELD_VALUES_TREE.to_string(),
            self.field_values_tree.len() as u64,
        );
        stats.insert(
            IMPORTANT_FIELDS_TREE.to_string(),
            self.important_fields_tree.len() as u64,
        );
        stats
    }

    // ========== GENERIC TREE OPERATIONS ==========

    /// Store any serializable item in a specific tree
    pub(crate) fn store_in_tree<K: AsRef<[u8]>, T: Serialize>(
        &self,
        tree: &sled::Tree,
        key: K,
        item: &T,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec(item)?;
        tree.insert(key.as_ref(), bytes)?;
        tree.flush()?;
        Ok(())
    }

    /// Retrieve any deserializable item from a specific tree
    pub(crate) fn get_from_tree<K: AsRef<[u8]>, T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        key: K,
    ) -> StoreResult<Option<T>> {
        match tree.get(key.as_ref())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete an item from a specific tree
    pub(crate) fn delete_from_tree<K: AsRef<[u8]>>(
        &self,
        tree: &sled::Tree,
        key: K,
    ) -> StoreResult<bool> {
        let existed = tree.remove(key.as_ref())?.is_some();
        tree.flush()?;
        Ok(existed)
    }

    /// Deserialize every value whose key starts with `prefix`
    pub(crate) fn scan_values<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        prefix: &[u8],
    ) -> StoreResult<Vec<T>> {
        let mut items = Vec::new();
        for result in tree.scan_prefix(prefix) {
            let (_, value) = result?;
            items.push(serde_json::from_slice(&value)?);
        }
        Ok(items)
    }

    /// Trailing ids of the composite keys under `owner`
    pub(crate) fn scan_index(
        &self,
        tree: &sled::Tree,
        tree_name: &'static str,
        owner: u64,
    ) -> StoreResult<Vec<u64>> {
        let mut ids = Vec::new();
        for result in tree.scan_prefix(owner.to_be_bytes()) {
            let (key, _) = result?;
            ids.push(decode_trailing_id(tree_name, &key)?);
        }
        Ok(ids)
    }

    /// Remove every key starting with `owner`; returns how many were removed
    pub(crate) fn remove_prefix(&self, tree: &sled::Tree, owner: u64) -> StoreResult<usize> {
        let mut removed = 0;
        for result in tree.scan_prefix(owner.to_be_bytes()) {
            let (key, _) = result?;
            tree.remove(key)?;
            removed += 1;
        }
        tree.flush()?;
        Ok(removed)
    }
}

pub(crate) fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn composite_key(owner: u64, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&owner.to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

fn decode_trailing_id(tree: &'static str, key: &[u8]) -> StoreResult<u64> {
    let bytes: [u8; 8] = key
        .get(8..16)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(StoreError::CorruptKey {
            tree,
            expected: 16,
            found: key.len(),
        })?;
    Ok(u64::from_be_bytes(bytes))
}

use super::core::{id_key, DbOperations};
use crate::error::StoreResult;
use crate::field::model::{Table, TableId};

impl DbOperations {
    /// Registers a table. Tables are owned by the surrounding metadata
    /// service; the catalog only reads them, so this exists for loaders and
    /// fixtures.
    pub fn insert_table(&self, name: &str, schema: Option<&str>) -> StoreResult<Table> {
        let table = Table {
            id: self.next_id()?,
            name: name.to_string(),
            schema: schema.map(str::to_string),
        };
        self.store_in_tree(&self.tables_tree, id_key(table.id), &table)?;
        Ok(table)
    }

    pub fn get_table(&self, id: TableId) -> StoreResult<Option<Table>> {
        self.get_from_tree(&self.tables_tree, id_key(id))
    }
}

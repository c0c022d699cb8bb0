//! The primitives to work with storage in transactional mode.

use crate::{
    kv_store::{
        BatchOperations,
        Key,
        KeyValueInspect,
        KeyValueMutate,
        StorageColumn,
        Value,
        WriteOperation,
    },
    Result as StorageResult,
};
use std::collections::{
    BTreeMap,
    HashMap,
};

/// The changes accumulated by a transaction, per column.
pub type Changes<Column> = HashMap<Column, BTreeMap<Key, WriteOperation>>;

/// The in-memory overlay of write operations on top of the `Storage`.
/// Reads see the overlay first and fall back to the storage. Nothing reaches
/// the storage until [`StorageTransaction::commit`]; dropping the transaction
/// discards the changes.
#[derive(Debug)]
pub struct StorageTransaction<Storage>
where
    Storage: KeyValueInspect,
{
    changes: Changes<Storage::Column>,
    storage: Storage,
}

impl<Storage> StorageTransaction<Storage>
where
    Storage: KeyValueInspect,
{
    /// Create a new storage transaction.
    pub fn new(storage: Storage) -> Self {
        Self {
            changes: Default::default(),
            storage,
        }
    }

    /// Returns `true` if the transaction has no pending changes.
    pub fn is_empty(&self) -> bool {
        self.changes.values().all(BTreeMap::is_empty)
    }

    /// Returns the storage below the overlay.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns the pending changes, leaving the storage untouched.
    pub fn into_changes(self) -> Changes<Storage::Column> {
        self.changes
    }
}

impl<Storage> StorageTransaction<Storage>
where
    Storage: BatchOperations,
{
    /// Committing of the state consumes `Self`.
    pub fn commit(self) -> StorageResult<Storage> {
        let Self {
            changes,
            mut storage,
        } = self;
        for (column, operations) in changes {
            tracing::trace!(column = column.name(), entries = operations.len(), "commit");
            storage.batch_write(column, operations.into_iter())?;
        }
        Ok(storage)
    }
}

impl<Storage> KeyValueInspect for StorageTransaction<Storage>
where
    Storage: KeyValueInspect,
{
    type Column = Storage::Column;

    fn get(&self, key: &[u8], column: Self::Column) -> StorageResult<Option<Value>> {
        let pending = self
            .changes
            .get(&column)
            .and_then(|operations| operations.get(key));
        match pending {
            Some(WriteOperation::Insert(value)) => Ok(Some(value.clone())),
            Some(WriteOperation::Remove) => Ok(None),
            None => self.storage.get(key, column),
        }
    }
}

impl<Storage> KeyValueMutate for StorageTransaction<Storage>
where
    Storage: KeyValueInspect,
{
    fn put(
        &mut self,
        key: &[u8],
        column: Self::Column,
        value: Value,
    ) -> StorageResult<()> {
        self.changes
            .entry(column)
            .or_default()
            .insert(key.to_vec(), WriteOperation::Insert(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8], column: Self::Column) -> StorageResult<()> {
        self.changes
            .entry(column)
            .or_default()
            .insert(key.to_vec(), WriteOperation::Remove);
        Ok(())
    }
}

impl<Storage> BatchOperations for StorageTransaction<Storage> where Storage: KeyValueInspect
{}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        column::Column,
        in_memory::MemoryStore,
    };
    use std::sync::Arc;

    fn value(byte: u8) -> Value {
        Arc::new(vec![byte])
    }

    #[test]
    fn reads_see_pending_writes_first() {
        let mut store = MemoryStore::default();
        store.put(b"a", Column::Headers, value(1)).unwrap();
        store.put(b"b", Column::Headers, value(2)).unwrap();

        let mut transaction = StorageTransaction::new(store.clone());
        transaction.put(b"a", Column::Headers, value(3)).unwrap();
        transaction.delete(b"b", Column::Headers).unwrap();

        assert_eq!(transaction.get(b"a", Column::Headers).unwrap(), Some(value(3)));
        assert_eq!(transaction.get(b"b", Column::Headers).unwrap(), None);
        assert_eq!(store.get(b"a", Column::Headers).unwrap(), Some(value(1)));
        assert_eq!(store.get(b"b", Column::Headers).unwrap(), Some(value(2)));
    }

    #[test]
    fn commit_applies_all_changes() {
        let mut store = MemoryStore::default();
        store.put(b"b", Column::Metadata, value(2)).unwrap();

        let mut transaction = StorageTransaction::new(&mut store);
        transaction.put(b"a", Column::Headers, value(1)).unwrap();
        transaction.delete(b"b", Column::Metadata).unwrap();
        transaction.commit().unwrap();

        assert_eq!(store.get(b"a", Column::Headers).unwrap(), Some(value(1)));
        assert_eq!(store.get(b"b", Column::Metadata).unwrap(), None);
    }

    #[test]
    fn dropping_discards_changes() {
        let mut store = MemoryStore::default();
        {
            let mut transaction = StorageTransaction::new(&mut store);
            transaction.put(b"a", Column::Genesis, value(1)).unwrap();
            assert!(!transaction.is_empty());
        }

        assert!(!store.exists(b"a", Column::Genesis).unwrap());
    }

    #[test]
    fn nested_transaction_commits_into_parent_only() {
        let mut store = MemoryStore::default();
        let mut outer = StorageTransaction::new(&mut store);
        {
            let mut inner = StorageTransaction::new(&mut outer);
            inner.put(b"a", Column::Headers, value(1)).unwrap();
            inner.commit().unwrap();
        }

        assert_eq!(outer.get(b"a", Column::Headers).unwrap(), Some(value(1)));
        let changes = outer.into_changes();
        assert_eq!(changes[&Column::Headers].len(), 1);
        assert!(!store.exists(b"a", Column::Headers).unwrap());
    }
}

//! The in-memory reference backend of the key-value ports.

use crate::{
    column::Column,
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
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    sync::Arc,
};

/// The thread-safe in-memory store with one ordered map per [`Column`].
/// Clones share the same maps, so several engines may work on one store.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    inner: Arc<[Mutex<BTreeMap<Key, Value>>; Column::COUNT]>,
}

impl MemoryStore {
    /// Returns the number of entries in the `column`.
    pub fn len(&self, column: Column) -> usize {
        self.inner[column.as_usize()].lock().len()
    }

    /// Returns `true` if the store has no entries in any column.
    pub fn is_empty(&self) -> bool {
        self.inner.iter().all(|column| column.lock().is_empty())
    }

    /// Returns a copy of every entry of the `column` in key order.
    pub fn snapshot(&self, column: Column) -> Vec<(Key, Value)> {
        self.inner[column.as_usize()]
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl KeyValueInspect for MemoryStore {
    type Column = Column;

    fn get(&self, key: &[u8], column: Self::Column) -> StorageResult<Option<Value>> {
        Ok(self.inner[column.as_usize()].lock().get(key).cloned())
    }
}

impl KeyValueMutate for MemoryStore {
    fn put(
        &mut self,
        key: &[u8],
        column: Self::Column,
        value: Value,
    ) -> StorageResult<()> {
        self.inner[column.as_usize()]
            .lock()
            .insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8], column: Self::Column) -> StorageResult<()> {
        self.inner[column.as_usize()].lock().remove(key);
        Ok(())
    }
}

impl BatchOperations for MemoryStore {
    fn batch_write<I>(&mut self, column: Self::Column, entries: I) -> StorageResult<()>
    where
        I: Iterator<Item = (Vec<u8>, WriteOperation)>,
    {
        let mut lock = self.inner[column.as_usize()].lock();
        for (key, operation) in entries {
            match operation {
                WriteOperation::Insert(value) => {
                    lock.insert(key, value);
                }
                WriteOperation::Remove => {
                    lock.remove(&key);
                }
            }
        }
        Ok(())
    }
}

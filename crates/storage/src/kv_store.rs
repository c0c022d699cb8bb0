//! The module provides plain abstract definition of the key-value store used by
//! the header sync services. Embedders plug their own database in by implementing
//! [`KeyValueInspect`] and [`KeyValueMutate`].

use crate::Result as StorageResult;
use std::sync::Arc;

/// The key of the storage.
pub type Key = Vec<u8>;
/// The value of the storage. It is wrapped into the `Arc` to share decoded headers
/// between the overlay and the backend without copying.
pub type Value = Arc<Vec<u8>>;

/// A column of the storage.
pub trait StorageColumn: Copy + core::fmt::Debug + Eq + core::hash::Hash {
    /// Returns the name of the column.
    fn name(&self) -> &'static str;

    /// Returns the id of the column.
    fn id(&self) -> u32;

    /// Returns the id of the column as an `usize`.
    fn as_usize(&self) -> usize {
        self.id() as usize
    }
}

/// The definition of the key-value inspection store.
#[impl_tools::autoimpl(for<T: trait> &T, &mut T, Box<T>)]
pub trait KeyValueInspect {
    /// The type of the column.
    type Column: StorageColumn;

    /// Checks if the value exists in the storage.
    fn exists(&self, key: &[u8], column: Self::Column) -> StorageResult<bool> {
        Ok(self.get(key, column)?.is_some())
    }

    /// Returns the value from the storage.
    fn get(&self, key: &[u8], column: Self::Column) -> StorageResult<Option<Value>>;
}

/// The definition of the key-value mutation store.
#[impl_tools::autoimpl(for<T: trait> &mut T, Box<T>)]
pub trait KeyValueMutate: KeyValueInspect {
    /// Inserts the `Value` into the storage, replacing the previous one.
    fn put(&mut self, key: &[u8], column: Self::Column, value: Value)
        -> StorageResult<()>;

    /// Removes the value from the storage. Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8], column: Self::Column) -> StorageResult<()>;
}

/// The operation to write into the storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOperation {
    /// Insert the value into the storage.
    Insert(Value),
    /// Remove the value from the storage.
    Remove,
}

/// The definition of the key-value store with batch operations.
#[impl_tools::autoimpl(for<T: trait> &mut T, Box<T>)]
pub trait BatchOperations: KeyValueMutate {
    /// Writes the batch of the entries into the storage.
    fn batch_write<I>(&mut self, column: Self::Column, entries: I) -> StorageResult<()>
    where
        I: Iterator<Item = (Vec<u8>, WriteOperation)>,
    {
        for (key, operation) in entries {
            match operation {
                WriteOperation::Insert(value) => self.put(&key, column, value)?,
                WriteOperation::Remove => self.delete(&key, column)?,
            }
        }
        Ok(())
    }
}

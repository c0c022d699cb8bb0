//! The module to help with tests.

use crate::{
    column::Column,
    kv_store::{
        KeyValueInspect,
        KeyValueMutate,
        Value,
    },
    Error as StorageError,
    Result as StorageResult,
};

mockall::mock! {
    /// The mocked key-value store, used to inject backend failures.
    pub KeyValueStore {}

    impl KeyValueInspect for KeyValueStore {
        type Column = Column;

        fn exists(&self, key: &[u8], column: Column) -> StorageResult<bool>;

        fn get(&self, key: &[u8], column: Column) -> StorageResult<Option<Value>>;
    }

    impl KeyValueMutate for KeyValueStore {
        fn put(&mut self, key: &[u8], column: Column, value: Value) -> StorageResult<()>;

        fn delete(&mut self, key: &[u8], column: Column) -> StorageResult<()>;
    }
}

/// The error the [`broken_store`] returns from every call.
pub fn backend_failure() -> StorageError {
    StorageError::DatabaseError(Box::new("disk is gone"))
}

/// Returns a store which fails every read and write with [`backend_failure`].
pub fn broken_store() -> MockKeyValueStore {
    let mut store = MockKeyValueStore::default();
    store.expect_get().returning(|_, _| Err(backend_failure()));
    store.expect_exists().returning(|_, _| Err(backend_failure()));
    store.expect_put().returning(|_, _, _| Err(backend_failure()));
    store.expect_delete().returning(|_, _| Err(backend_failure()));
    store
}

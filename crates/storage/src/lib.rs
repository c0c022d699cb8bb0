//! The crate `header-sync-storage` contains the storage primitives used by the header
//! sync services. It doesn't depend on a concrete database: services work with the
//! key-value ports defined in [`kv_store`], and [`header_store::HeaderStore`] maps the
//! side-chain entities onto them. [`in_memory::MemoryStore`] is a reference backend
//! used by tests and embedders without a database of their own.

#![deny(unused_must_use)]

pub mod cache;
pub mod codec;
pub mod column;
pub mod header_store;
pub mod in_memory;
pub mod kv_store;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
pub mod transactional;

/// The storage result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, derive_more::Display, derive_more::From)]
#[non_exhaustive]
/// Error occurring during interaction with storage
pub enum Error {
    /// Error occurred during serialization or deserialization of the entity.
    #[display(fmt = "error performing serialization or deserialization `{_0}`")]
    Codec(anyhow::Error),
    /// Error occurred during interaction with database.
    #[display(fmt = "error occurred in the underlying datastore `{_0:?}`")]
    DatabaseError(Box<dyn core::fmt::Debug + Send + Sync>),
    /// This error should be created with `not_found` macro.
    #[display(fmt = "resource of type `{_0}` was not found at the: {_1}")]
    NotFound(&'static str, &'static str),
    /// Unknown or not expected(by architecture) error.
    #[from]
    Other(anyhow::Error),
}

impl std::error::Error for Error {}

#[cfg(feature = "test-helpers")]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

/// The helper trait to work with storage errors.
pub trait IsNotFound {
    /// Return `true` if the error is [`Error::NotFound`].
    fn is_not_found(&self) -> bool;
}

impl IsNotFound for Error {
    fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_, _))
    }
}

impl<T> IsNotFound for Result<T> {
    fn is_not_found(&self) -> bool {
        match self {
            Err(err) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Converts a lookup that treats absence as [`Error::NotFound`] into one that
/// returns `None`, keeping every other error.
pub trait StorageOptional<T> {
    /// Maps [`Error::NotFound`] into `Ok(None)`.
    fn optional(self) -> Result<Option<T>>;
}

impl<T> StorageOptional<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Creates `StorageError::NotFound` error with file and line information inside.
///
/// # Examples
///
/// ```
/// use header_sync_storage::not_found;
/// use header_sync_types::blockchain::stored::StoredHeader;
///
/// let string_type = not_found!("BlockHash");
/// let entity_type = not_found!(StoredHeader);
/// ```
#[macro_export]
macro_rules! not_found {
    ($name: literal) => {
        $crate::Error::NotFound($name, concat!(file!(), ":", line!()))
    };
    ($ty: ty) => {
        $crate::Error::NotFound(
            ::core::any::type_name::<$ty>(),
            concat!(file!(), ":", line!()),
        )
    };
}

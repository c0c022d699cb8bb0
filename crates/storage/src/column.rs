//! The module defines the `Column` used by the header store.

use crate::kv_store::StorageColumn;

/// Database tables column ids. Every key inside of a column starts with the
/// big-endian side-chain id, so chains never share an entry.
#[repr(u32)]
#[derive(
    Copy,
    Clone,
    Debug,
    strum_macros::EnumCount,
    strum_macros::IntoStaticStr,
    PartialEq,
    Eq,
    enum_iterator::Sequence,
    Hash,
)]
pub enum Column {
    /// `chain_id ++ block_hash` -> `StoredHeader`.
    Headers = 0,
    /// `chain_id ++ height` -> canonical `BlockHash`.
    CanonicalHashes = 1,
    /// `chain_id` -> current canonical height.
    Metadata = 2,
    /// `chain_id` -> `Genesis`.
    Genesis = 3,
}

impl Column {
    /// The total count of variants in the enum.
    pub const COUNT: usize = <Self as strum::EnumCount>::COUNT;

    /// Returns the `u32` representation of the `Column`.
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }
}

impl StorageColumn for Column {
    fn name(&self) -> &'static str {
        self.into()
    }

    fn id(&self) -> u32 {
        self.as_u32()
    }
}

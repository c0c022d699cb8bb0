//! Primitive types used across the header sync services.

pub use ethers_core::types::{
    Address,
    Bloom,
    H256,
    H64,
    U256,
};
use serde::{
    Deserialize,
    Serialize,
};

/// The hash of a side-chain header.
pub type BlockHash = H256;

/// The cumulative weight ("total difficulty") of a branch.
pub type Weight = U256;

/// Identifies a bridged side chain. Every storage key and every piece of
/// per-chain state is namespaced by it.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct SideChainId(u64);

impl SideChainId {
    /// Creates a new side chain id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the big-endian representation used as the storage key prefix.
    pub const fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

//! The persisted form of an admitted header.

use super::{
    header::ForeignHeader,
    primitives::{
        Address,
        BlockHash,
        Weight,
    },
};
use serde::{
    Deserialize,
    Serialize,
};

/// The unit persisted for every admitted header. Stored headers are never mutated
/// or removed, so headers of losing forks stay available for later reorgs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHeader {
    pub header: ForeignHeader,
    /// The hash of `header`, kept to avoid re-hashing on every ancestry walk.
    pub hash: BlockHash,
    /// The cumulative weight: the header difficulty plus the weight of the parent.
    pub weight: Weight,
    /// The nearest checkpoint ancestor. `None` only for the genesis header.
    pub epoch_parent_hash: Option<BlockHash>,
    /// The signer recovered from the seal during verification.
    pub signer: Option<Address>,
}

impl StoredHeader {
    /// The height of the header.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// The hash of the parent header.
    pub fn parent_hash(&self) -> &BlockHash {
        &self.header.parent_hash
    }
}

//! Validator epochs of rotation-based side chains.

use super::{
    header::{
        parse_signer_list,
        ForeignHeader,
    },
    primitives::{
        Address,
        BlockHash,
    },
};
use serde::{
    Deserialize,
    Serialize,
};

/// The validator set that becomes active starting from the checkpoint at `start_height`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEpoch {
    /// The height of the checkpoint header that announced the set.
    pub start_height: u64,
    /// The validators in the order they were announced.
    pub validators: Vec<Address>,
    /// The hash of the checkpoint header that announced the set.
    pub hash: BlockHash,
}

impl ValidatorEpoch {
    /// Builds the epoch announced by a checkpoint header. Returns `None` if the header
    /// doesn't carry a well-formed, non-empty signer list.
    pub fn from_checkpoint(header: &ForeignHeader, hash: BlockHash) -> Option<Self> {
        let validators = parse_signer_list(header.signer_bytes()?)?;
        if validators.is_empty() {
            return None
        }
        Some(Self {
            start_height: header.number,
            validators,
            hash,
        })
    }

    /// The number of validators in the epoch.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if the epoch has no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Returns the rotation slot of the `validator`, if it belongs to the epoch.
    pub fn position(&self, validator: &Address) -> Option<usize> {
        self.validators.iter().position(|v| v == validator)
    }

    /// The number of blocks the set needs before a newer set announced after it
    /// may take over, and the size of the recently-signed window.
    pub fn half(&self) -> u64 {
        (self.validators.len() / 2) as u64
    }
}

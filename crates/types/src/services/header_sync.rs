//! The envelopes relayers submit to the header sync engine.
//!
//! Only the outer envelope is defined here. Headers stay opaque chain-native
//! encodings and are decoded by the engine when they are admitted.

use crate::SideChainId;
use serde::{
    Deserialize,
    Serialize,
};

/// Submission of a batch of consecutive headers for one side chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBlockHeadersParam {
    pub chain_id: u64,
    pub headers: Vec<Vec<u8>>,
}

/// Submission of the trust anchor of a side chain. `genesis_header` is the JSON
/// encoded [`GenesisBundle`](crate::blockchain::genesis::GenesisBundle).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGenesisHeaderParam {
    pub chain_id: u64,
    pub genesis_header: Vec<u8>,
}

macro_rules! impl_envelope {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Decodes the envelope from its wire form.
                pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
                    postcard::from_bytes(bytes)
                }

                /// Encodes the envelope into its wire form.
                pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
                    postcard::to_allocvec(self)
                }

                /// The side chain the envelope is addressed to.
                pub fn side_chain_id(&self) -> SideChainId {
                    SideChainId::new(self.chain_id)
                }
            }
        )*
    };
}

impl_envelope!(SyncBlockHeadersParam, SyncGenesisHeaderParam);

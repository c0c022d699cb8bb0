//! The crate `header-sync-types` contains the types shared by the side-chain header
//! sync services: foreign headers and their stored form, validator epochs, the
//! genesis bundle, and the envelopes relayers submit.

#![deny(unused_must_use)]

pub mod blockchain;
pub mod services;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use ethers_core;

pub use blockchain::primitives::{
    Address,
    BlockHash,
    Bloom,
    SideChainId,
    Weight,
    H256,
    H64,
    U256,
};

//! Consensus verification of side-chain headers.
//!
//! Every supported side chain signs its headers with a single producer seal and
//! decides who may sign with either a fixed rotation of validator epochs
//! ([`fixed_rotation::FixedRotation`]) or signer voting
//! ([`voting_snapshot::VotingSnapshot`]). Both implement
//! [`block_verifier::ConsensusVerifier`].

#![deny(unused_must_use)]

pub mod block_verifier;
pub mod epoch;
pub mod error;
pub mod fixed_rotation;
pub mod ports;
pub mod voting_snapshot;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use block_verifier::{
    ChainVerifier,
    ConsensusVerifier,
    Verified,
};
pub use error::{
    Error,
    VerifyError,
};

#[cfg(test)]
header_sync_trace::enable_tracing!();

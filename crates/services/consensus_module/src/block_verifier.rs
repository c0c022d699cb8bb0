//! The module provides the functionality that verifies the headers based on the
//! consensus of their side chain, and the checks shared by all consensus flavors.

use crate::{
    error::{
        Error,
        VerifyError,
    },
    fixed_rotation::FixedRotation,
    ports::{
        HeaderReader,
        SignerRecovery,
    },
    voting_snapshot::VotingSnapshot,
};
use header_sync_chain_config::{
    ConsensusFlavor,
    SealHashScheme,
    SideChainConfig,
};
use header_sync_types::{
    blockchain::{
        genesis::{
            Genesis,
            GenesisBundle,
        },
        header::{
            empty_uncle_hash,
            parse_signer_list,
            ForeignHeader,
            EXTRA_SEAL,
            EXTRA_VANITY,
        },
        stored::StoredHeader,
    },
    Address,
    BlockHash,
    H256,
    U256,
};
use std::sync::Arc;


/// The difficulty of a header sealed by the signer whose turn it is.
pub const DIFF_IN_TURN: u64 = 2;
/// The difficulty of a header sealed out of turn.
pub const DIFF_NO_TURN: u64 = 1;

/// The outcome of a successful verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verified {
    /// The authorized signer recovered from the seal.
    pub signer: Address,
    /// The nearest checkpoint ancestor of the header.
    pub epoch_parent_hash: BlockHash,
}

/// Verifies headers against the consensus rules of one side chain.
pub trait ConsensusVerifier: Send + Sync {
    /// Verifies the `header` on top of its stored `parent`. `now` is the local
    /// time in seconds used by the future-block rule.
    fn verify(
        &self,
        chain: &dyn HeaderReader,
        header: &ForeignHeader,
        parent: &StoredHeader,
        now: u64,
    ) -> Result<Verified, Error>;

    /// Checks the structure of the genesis bundle and builds the genesis record.
    fn validate_genesis(&self, bundle: &GenesisBundle) -> Result<Genesis, Error>;

    /// The signer of the genesis header, if its seal can be recovered.
    fn genesis_signer(&self, header: &ForeignHeader) -> Option<Address>;
}

/// The verifier picked for a side chain from its configuration.
pub enum ChainVerifier {
    FixedRotation(FixedRotation),
    VotingSnapshot(VotingSnapshot),
}

impl ChainVerifier {
    pub fn from_config(
        config: SideChainConfig,
        recovery: Arc<dyn SignerRecovery>,
    ) -> Self {
        match config.consensus.clone() {
            ConsensusFlavor::FixedRotation(params) => {
                Self::FixedRotation(FixedRotation::new(config, params, recovery))
            }
            ConsensusFlavor::VotingSnapshot(params) => {
                Self::VotingSnapshot(VotingSnapshot::new(config, params, recovery))
            }
        }
    }
}

impl ConsensusVerifier for ChainVerifier {
    fn verify(
        &self,
        chain: &dyn HeaderReader,
        header: &ForeignHeader,
        parent: &StoredHeader,
        now: u64,
    ) -> Result<Verified, Error> {
        match self {
            ChainVerifier::FixedRotation(verifier) => {
                verifier.verify(chain, header, parent, now)
            }
            ChainVerifier::VotingSnapshot(verifier) => {
                verifier.verify(chain, header, parent, now)
            }
        }
    }

    fn validate_genesis(&self, bundle: &GenesisBundle) -> Result<Genesis, Error> {
        match self {
            ChainVerifier::FixedRotation(verifier) => verifier.validate_genesis(bundle),
            ChainVerifier::VotingSnapshot(verifier) => verifier.validate_genesis(bundle),
        }
    }

    fn genesis_signer(&self, header: &ForeignHeader) -> Option<Address> {
        match self {
            ChainVerifier::FixedRotation(verifier) => verifier.genesis_signer(header),
            ChainVerifier::VotingSnapshot(verifier) => verifier.genesis_signer(header),
        }
    }
}

/// Rejects headers from the future.
pub fn verify_timestamp(
    header: &ForeignHeader,
    now: u64,
    allowed_drift: u64,
) -> Result<(), VerifyError> {
    if header.timestamp > now.saturating_add(allowed_drift) {
        return Err(VerifyError::FutureBlock {
            timestamp: header.timestamp,
            now,
        })
    }
    Ok(())
}

/// Checks the `vanity || signers || seal` layout of the extra data and returns
/// the signer list. The list must be non-empty on checkpoints and empty otherwise.
pub fn verify_extra_layout(
    header: &ForeignHeader,
    checkpoint: bool,
) -> Result<Vec<Address>, VerifyError> {
    if header.extra_data.len() < EXTRA_VANITY {
        return Err(VerifyError::MissingVanity)
    }
    if header.extra_data.len() < EXTRA_VANITY + EXTRA_SEAL {
        return Err(VerifyError::MissingSignature)
    }
    let bytes = header
        .signer_bytes()
        .ok_or(VerifyError::MissingSignature)?;
    let signers = parse_signer_list(bytes).ok_or(VerifyError::InvalidSignerList)?;
    if checkpoint == signers.is_empty() {
        return Err(VerifyError::InvalidSignerList)
    }
    Ok(signers)
}

/// Checks the fields the supported chains keep constant.
pub fn verify_constant_fields(header: &ForeignHeader) -> Result<(), VerifyError> {
    if !header.mix_digest.is_zero() {
        return Err(VerifyError::InvalidMixDigest)
    }
    if header.uncle_hash != empty_uncle_hash() {
        return Err(VerifyError::InvalidUncleHash)
    }
    Ok(())
}

/// The difficulty is either [`DIFF_IN_TURN`] or [`DIFF_NO_TURN`].
pub fn verify_difficulty_sentinel(header: &ForeignHeader) -> Result<(), VerifyError> {
    if header.difficulty != U256::from(DIFF_IN_TURN)
        && header.difficulty != U256::from(DIFF_NO_TURN)
    {
        return Err(VerifyError::InvalidDifficulty)
    }
    Ok(())
}

/// The difficulty matches the turn of the signer.
pub fn verify_turn_difficulty(
    header: &ForeignHeader,
    in_turn: bool,
) -> Result<(), VerifyError> {
    let expected = if in_turn { DIFF_IN_TURN } else { DIFF_NO_TURN };
    if header.difficulty != U256::from(expected) {
        return Err(VerifyError::InvalidDifficulty)
    }
    Ok(())
}

/// Checks the fields that depend on the parent header.
pub fn verify_cascading_fields(
    config: &SideChainConfig,
    header: &ForeignHeader,
    parent: &ForeignHeader,
) -> Result<(), VerifyError> {
    if parent.number.checked_add(1) != Some(header.number) {
        return Err(VerifyError::InvalidNumber)
    }
    if header.timestamp < parent.timestamp.saturating_add(config.block_period) {
        return Err(VerifyError::InvalidTimestamp)
    }
    if header.gas_used > header.gas_limit {
        return Err(VerifyError::InvalidGasLimit)
    }
    let bound = parent.gas_limit / config.gas_limit_bound_divisor;
    if header.gas_limit.abs_diff(parent.gas_limit) >= bound {
        return Err(VerifyError::InvalidGasLimit)
    }
    if header.gas_limit < config.min_gas_limit {
        return Err(VerifyError::InvalidGasLimit)
    }
    Ok(())
}

/// Returns the hash the producer signed according to the `scheme`.
pub fn seal_hash(header: &ForeignHeader, scheme: SealHashScheme, chain_id: u64) -> H256 {
    match scheme {
        SealHashScheme::Plain => header.seal_hash(None),
        SealHashScheme::ChainIdPrefixed => header.seal_hash(Some(chain_id)),
    }
}

/// Recovers the producer of the header from its seal.
pub fn recover_signer(
    recovery: &dyn SignerRecovery,
    header: &ForeignHeader,
    hash: &H256,
) -> Result<Address, VerifyError> {
    let seal = header.seal().ok_or(VerifyError::MissingSignature)?;
    recovery.recover_signer(hash, seal).map_err(|e| {
        tracing::debug!("Failed to recover the signer of {}: {e}", header.number);
        VerifyError::InvalidSeal
    })
}

/// The nearest checkpoint ancestor of a child of the `parent`.
pub fn epoch_parent_hash(parent: &StoredHeader, epoch_length: u64) -> BlockHash {
    match parent.epoch_parent_hash {
        Some(hash) if !parent.header.is_checkpoint(epoch_length) => hash,
        _ => parent.hash,
    }
}

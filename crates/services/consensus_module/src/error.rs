use header_sync_storage::Error as StorageError;
use header_sync_types::Address;

/// The reasons a header breaks the consensus rules of its side chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("The header timestamp {timestamp} is ahead of the local time {now}")]
    FutureBlock { timestamp: u64, now: u64 },
    #[error("The extra data is shorter than the signer vanity")]
    MissingVanity,
    #[error("The extra data doesn't contain the 65 byte seal")]
    MissingSignature,
    #[error("The signer list in the extra data is malformed")]
    InvalidSignerList,
    #[error("The difficulty doesn't match the turn of the signer")]
    InvalidDifficulty,
    #[error("The signer {0:?} signed one of the recent headers")]
    RecentlySigned(Address),
    #[error("The checkpoint signer list differs from the voted signers")]
    MismatchingCheckpointSigners,
    #[error("The gas limit or gas usage is out of bounds")]
    InvalidGasLimit,
    #[error("The header timestamp is too close to the parent timestamp")]
    InvalidTimestamp,
    #[error("The signer {0:?} is not authorized to seal the header")]
    UnauthorizedSigner(Address),
    #[error("The mix digest is not zero")]
    InvalidMixDigest,
    #[error("The uncle hash is not the hash of an empty list")]
    InvalidUncleHash,
    #[error("The header number doesn't follow the parent number")]
    InvalidNumber,
    #[error("The nonce is neither an authorization nor a drop vote")]
    InvalidVote,
    #[error("The checkpoint carries a vote")]
    InvalidCheckpointVote,
    #[error("The signer can't be recovered from the seal")]
    InvalidSeal,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Verification(#[from] VerifyError),
    #[error("Failed to resolve the signers governing the header: {0}")]
    EpochResolutionFailed(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    pub(crate) fn epoch_resolution(message: impl Into<String>) -> Self {
        Self::EpochResolutionFailed(message.into())
    }
}

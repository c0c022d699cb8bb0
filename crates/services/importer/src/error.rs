use header_sync_chain_config::ConfigError;
use header_sync_consensus::{
    Error as ConsensusError,
    VerifyError,
};
use header_sync_storage::Error as StorageError;
use header_sync_types::SideChainId;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Side chain configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("The side chain {0} already has a genesis header")]
    AlreadyInitialized(SideChainId),
    #[error("Failed to deserialize the parameters: {0}")]
    ParamDeserializeError(String),
    #[error("Header verification failed: {0}")]
    Verification(#[from] VerifyError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Failed to resolve the signers governing the header: {0}")]
    EpochResolutionFailed(String),
    #[error("The transaction is not authorized by the relay operator: {0}")]
    OperatorAuthError(anyhow::Error),
    #[error("The cumulative weight overflowed")]
    Overflow,
}

impl Error {
    pub(crate) fn deserialize(err: impl core::fmt::Display) -> Self {
        Self::ParamDeserializeError(err.to_string())
    }
}

impl From<ConsensusError> for Error {
    fn from(err: ConsensusError) -> Self {
        match err {
            ConsensusError::Verification(err) => Self::Verification(err),
            ConsensusError::EpochResolutionFailed(message) => {
                Self::EpochResolutionFailed(message)
            }
            ConsensusError::Storage(err) => Self::StorageError(err),
            _ => Self::EpochResolutionFailed(err.to_string()),
        }
    }
}

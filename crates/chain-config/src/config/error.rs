use header_sync_types::SideChainId;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("No configuration for the side chain {0}")]
    UnknownChain(SideChainId),
    #[error("The epoch length of the side chain {0} must be positive")]
    ZeroEpochLength(SideChainId),
    #[error("The side chain {chain} may trail 1 or 2 epochs, got {trailing}")]
    InvalidTrailingEpochs { chain: SideChainId, trailing: u8 },
    #[error("The gas limit bound divisor of the side chain {0} must be positive")]
    ZeroGasLimitBoundDivisor(SideChainId),
    #[error("Failed to read the chain configs: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse the chain configs: {0}")]
    Json(#[from] serde_json::Error),
}

use crate::{
    ConfigError,
    ConsensusFlavor,
    RotationAnchor,
    RotationParams,
    SealHashScheme,
    VotingParams,
};
use header_sync_types::SideChainId;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    path::Path,
    str::FromStr,
};

pub const LOCAL_TESTNET: &str = "local_testnet";
/// The side chain of the local testnet that rotates validator epochs.
pub const LOCAL_ROTATION_CHAIN: SideChainId = SideChainId::new(1);
/// The side chain of the local testnet that votes on signers.
pub const LOCAL_VOTING_CHAIN: SideChainId = SideChainId::new(2);

/// The consensus rules of one side chain.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SideChainConfig {
    /// Checkpoint headers sit at heights divisible by the epoch length.
    pub epoch_length: u64,
    /// The minimal number of seconds between a header and its parent.
    pub block_period: u64,
    /// The chain id the side chain uses natively, e.g. in seal hashes.
    pub internal_chain_id: u64,
    pub consensus: ConsensusFlavor,
    #[serde(default = "SideChainConfig::default_gas_limit_bound_divisor")]
    pub gas_limit_bound_divisor: u64,
    #[serde(default = "SideChainConfig::default_min_gas_limit")]
    pub min_gas_limit: u64,
    /// How many seconds a header timestamp may run ahead of the local clock.
    #[serde(default)]
    pub allowed_future_drift: u64,
}

impl SideChainConfig {
    fn default_gas_limit_bound_divisor() -> u64 {
        256
    }

    fn default_min_gas_limit() -> u64 {
        5000
    }

    /// Rotation chain with 200-block epochs and 3-second blocks.
    pub fn fixed_rotation_testnet() -> Self {
        Self {
            epoch_length: 200,
            block_period: 3,
            internal_chain_id: 97,
            consensus: ConsensusFlavor::FixedRotation(RotationParams {
                trailing_epochs: 2,
                guard_offset: 1,
                anchor: RotationAnchor::EpochStart,
                seal_hash: SealHashScheme::ChainIdPrefixed,
            }),
            gas_limit_bound_divisor: Self::default_gas_limit_bound_divisor(),
            min_gas_limit: Self::default_min_gas_limit(),
            allowed_future_drift: 0,
        }
    }

    /// Clique chain with 30000-block epochs and 15-second blocks.
    pub fn voting_testnet() -> Self {
        Self {
            epoch_length: 30_000,
            block_period: 15,
            internal_chain_id: 5,
            consensus: ConsensusFlavor::VotingSnapshot(VotingParams::default()),
            gas_limit_bound_divisor: 1024,
            min_gas_limit: Self::default_min_gas_limit(),
            allowed_future_drift: 0,
        }
    }

    /// Checks the parameters the verifiers rely on.
    pub fn validate(&self, chain: SideChainId) -> Result<(), ConfigError> {
        if self.epoch_length == 0 {
            return Err(ConfigError::ZeroEpochLength(chain))
        }
        if self.gas_limit_bound_divisor == 0 {
            return Err(ConfigError::ZeroGasLimitBoundDivisor(chain))
        }
        if let ConsensusFlavor::FixedRotation(params) = &self.consensus {
            if !(1..=RotationParams::MAX_TRAILING_EPOCHS).contains(&params.trailing_epochs)
            {
                return Err(ConfigError::InvalidTrailingEpochs {
                    chain,
                    trailing: params.trailing_epochs,
                })
            }
        }
        Ok(())
    }
}

/// Gives the header sync engine the rules of a side chain.
pub trait SideChainConfigProvider: Send + Sync {
    fn side_chain_config(&self, chain: SideChainId) -> Result<SideChainConfig, ConfigError>;
}

/// The registry of the configured side chains.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct ChainConfigs {
    chains: BTreeMap<SideChainId, SideChainConfig>,
}

impl ChainConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the configuration of the `chain`.
    pub fn with_chain(mut self, chain: SideChainId, config: SideChainConfig) -> Self {
        self.chains.insert(chain, config);
        self
    }

    pub fn insert(&mut self, chain: SideChainId, config: SideChainConfig) {
        self.chains.insert(chain, config);
    }

    pub fn chains(&self) -> impl Iterator<Item = (&SideChainId, &SideChainConfig)> {
        self.chains.iter()
    }

    pub fn local_testnet() -> Self {
        Self::new()
            .with_chain(
                LOCAL_ROTATION_CHAIN,
                SideChainConfig::fixed_rotation_testnet(),
            )
            .with_chain(LOCAL_VOTING_CHAIN, SideChainConfig::voting_testnet())
    }

    /// Loads the registry from a JSON file and validates every entry.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read(path.as_ref())?;
        let configs: Self = serde_json::from_slice(&contents)?;
        configs.validate()?;
        tracing::info!(
            "Loaded {} side chain configs from {}",
            configs.chains.len(),
            path.as_ref().display()
        );
        Ok(configs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chains
            .iter()
            .try_for_each(|(chain, config)| config.validate(*chain))
    }
}

impl SideChainConfigProvider for ChainConfigs {
    fn side_chain_config(&self, chain: SideChainId) -> Result<SideChainConfig, ConfigError> {
        let config = self
            .chains
            .get(&chain)
            .ok_or(ConfigError::UnknownChain(chain))?;
        config.validate(chain)?;
        Ok(config.clone())
    }
}

impl FromStr for ChainConfigs {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LOCAL_TESTNET => Ok(Self::local_testnet()),
            path => Self::load_from_file(path),
        }
    }
}

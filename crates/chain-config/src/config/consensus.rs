use serde::{
    Deserialize,
    Serialize,
};

/// The consensus family of a side chain and its parameters.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum ConsensusFlavor {
    /// Validator sets announced at checkpoints rotate in a fixed order.
    FixedRotation(RotationParams),
    /// Signers are added and removed by on-chain votes (Clique).
    VotingSnapshot(VotingParams),
}

impl ConsensusFlavor {
    pub fn name(&self) -> &'static str {
        match self {
            ConsensusFlavor::FixedRotation(_) => "FixedRotation",
            ConsensusFlavor::VotingSnapshot(_) => "VotingSnapshot",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct RotationParams {
    /// How many epochs before the current one may still govern a header. The
    /// epoch window holds `trailing_epochs + 1` entries.
    #[serde(default = "RotationParams::default_trailing_epochs")]
    pub trailing_epochs: u8,
    /// Shifts the in-turn index: `(number - anchor - guard_offset) mod n`.
    #[serde(default)]
    pub guard_offset: u64,
    #[serde(default)]
    pub anchor: RotationAnchor,
    #[serde(default)]
    pub seal_hash: SealHashScheme,
}

impl RotationParams {
    pub const MAX_TRAILING_EPOCHS: u8 = 2;

    fn default_trailing_epochs() -> u8 {
        Self::MAX_TRAILING_EPOCHS
    }
}

impl Default for RotationParams {
    fn default() -> Self {
        Self {
            trailing_epochs: Self::default_trailing_epochs(),
            guard_offset: 0,
            anchor: RotationAnchor::default(),
            seal_hash: SealHashScheme::default(),
        }
    }
}

/// The height the rotation index counts from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum RotationAnchor {
    /// The start of the latest epoch announced before the header.
    #[default]
    EpochStart,
    /// Height zero.
    Zero,
}

/// How the hash signed by the block producer is built.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum SealHashScheme {
    /// keccak256 of the header RLP without the seal.
    Plain,
    /// Same as `Plain` with the numeric chain id prepended to the list.
    #[default]
    ChainIdPrefixed,
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct VotingParams {
    /// The number of snapshots kept in memory, keyed by block hash.
    #[serde(default = "VotingParams::default_snapshot_cache")]
    pub snapshot_cache: usize,
}

impl VotingParams {
    fn default_snapshot_cache() -> usize {
        128
    }
}

impl Default for VotingParams {
    fn default() -> Self {
        Self {
            snapshot_cache: Self::default_snapshot_cache(),
        }
    }
}

//! The per-chain trust anchor.

use super::{
    epoch::ValidatorEpoch,
    header::ForeignHeader,
    primitives::BlockHash,
};
use serde::{
    Deserialize,
    Serialize,
};

/// The genesis record of a side chain. Written once by the bootstrap and never
/// changed afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    pub header: ForeignHeader,
    pub hash: BlockHash,
    /// Validator epochs governing the first headers after genesis, newest first.
    /// Empty for chains that don't rotate fixed validator epochs.
    pub epochs: Vec<ValidatorEpoch>,
}

impl Genesis {
    /// The height of the genesis header.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}

/// The bootstrap payload submitted by the relay operator: the trusted header and
/// the validator epochs preceding it, newest first.
///
/// The JSON form carries the header as hex-encoded chain-native RLP:
///
/// ```json
/// { "header": "0xf9025e...", "epochs": [{ "start_height": 200, "validators": ["0x..."], "hash": "0x..." }] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBundle {
    #[serde(with = "rlp_hex")]
    pub header: ForeignHeader,
    #[serde(default)]
    pub epochs: Vec<ValidatorEpoch>,
}

impl GenesisBundle {
    /// Decodes the bundle from its JSON form.
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the bundle into its JSON form.
    pub fn to_json(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

mod rlp_hex {
    use super::ForeignHeader;
    use serde::{
        de::Error,
        Deserialize,
        Deserializer,
        Serializer,
    };

    pub fn serialize<S>(header: &ForeignHeader, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(header.encode())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ForeignHeader, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let encoded = encoded.strip_prefix("0x").unwrap_or(&encoded);
        let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
        ForeignHeader::decode(&bytes).map_err(|e| D::Error::custom(format!("{e:?}")))
    }
}

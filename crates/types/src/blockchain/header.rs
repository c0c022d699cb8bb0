//! Foreign (side-chain native) block header.
//!
//! The engine accepts Ethereum-family headers encoded as RLP lists. The header
//! hash is the keccak256 of that encoding and the intrinsic weight of a header
//! is its difficulty. The `extra` field is laid out as
//! `vanity (32 bytes) || signer list (20 bytes * n, checkpoints only) || seal (65 bytes)`.

use super::primitives::{
    Address,
    BlockHash,
    Bloom,
    H256,
    H64,
    U256,
};
use ethers_core::utils::{
    keccak256,
    rlp::{
        self,
        Decodable,
        DecoderError,
        Encodable,
        Rlp,
        RlpStream,
    },
};
use serde::{
    Deserialize,
    Serialize,
};

/// Fixed number of extra-data prefix bytes reserved for signer vanity.
pub const EXTRA_VANITY: usize = 32;
/// Fixed number of extra-data suffix bytes reserved for the signer seal.
pub const EXTRA_SEAL: usize = 65;
/// The size of one address inside of the signer list.
pub const ADDRESS_LENGTH: usize = 20;

/// The number of RLP fields of a header without the base fee.
const LEGACY_FIELDS: usize = 15;
/// The number of RLP fields of a header with the base fee.
const LONDON_FIELDS: usize = 16;

/// Keccak256 of the RLP encoding of an empty list. Every header of the supported
/// consensus families must carry it as the uncle hash.
pub fn empty_uncle_hash() -> H256 {
    H256(keccak256([0xc0u8]))
}

/// The chain-native header submitted by relayers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignHeader {
    pub parent_hash: BlockHash,
    pub uncle_hash: H256,
    /// The beneficiary. Voting chains use it as the vote candidate.
    pub coinbase: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    /// The intrinsic weight of the header.
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_digest: H256,
    /// Voting chains use it as the vote direction.
    pub nonce: H64,
    pub base_fee_per_gas: Option<U256>,
}

impl ForeignHeader {
    /// Decodes the header from its chain-native RLP encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecoderError> {
        rlp::decode(bytes)
    }

    /// Returns the chain-native RLP encoding of the header.
    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Returns the hash of the header.
    pub fn hash(&self) -> BlockHash {
        H256(keccak256(self.encode()))
    }

    /// Returns the hash the block producer signs: the header encoding without the
    /// seal. When `chain_id` is set, it is prepended to the signed list, as done by
    /// chains that protect seals against cross-chain replay.
    pub fn seal_hash(&self, chain_id: Option<u64>) -> H256 {
        let unsealed_len = self.extra_data.len().saturating_sub(EXTRA_SEAL);
        let extra = &self.extra_data[..unsealed_len];
        let mut stream = RlpStream::new();
        self.stream_fields(&mut stream, chain_id, extra);
        H256(keccak256(stream.out()))
    }

    /// Returns the 65-byte seal at the end of the extra data, if present.
    pub fn seal(&self) -> Option<&[u8]> {
        let len = self.extra_data.len();
        if len < EXTRA_VANITY + EXTRA_SEAL {
            return None
        }
        Some(&self.extra_data[len - EXTRA_SEAL..])
    }

    /// Returns the bytes between the vanity and the seal. They hold the signer list on
    /// checkpoint headers and must be empty otherwise.
    pub fn signer_bytes(&self) -> Option<&[u8]> {
        let len = self.extra_data.len();
        if len < EXTRA_VANITY + EXTRA_SEAL {
            return None
        }
        Some(&self.extra_data[EXTRA_VANITY..len - EXTRA_SEAL])
    }

    /// Returns `true` if the header sits on an epoch boundary.
    pub fn is_checkpoint(&self, epoch_length: u64) -> bool {
        epoch_length != 0 && self.number % epoch_length == 0
    }

    fn field_count(&self) -> usize {
        if self.base_fee_per_gas.is_some() {
            LONDON_FIELDS
        } else {
            LEGACY_FIELDS
        }
    }

    fn stream_fields(&self, s: &mut RlpStream, chain_id: Option<u64>, extra: &[u8]) {
        let mut fields = self.field_count();
        if chain_id.is_some() {
            fields += 1;
        }
        s.begin_list(fields);
        if let Some(chain_id) = chain_id {
            s.append(&chain_id);
        }
        s.append(&self.parent_hash);
        s.append(&self.uncle_hash);
        s.append(&self.coinbase);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&extra.to_vec());
        s.append(&self.mix_digest);
        s.append(&self.nonce);
        if let Some(base_fee) = &self.base_fee_per_gas {
            s.append(base_fee);
        }
    }
}

/// Splits a signer list into addresses. Returns `None` if the length is not a
/// multiple of the address size.
pub fn parse_signer_list(bytes: &[u8]) -> Option<Vec<Address>> {
    if bytes.len() % ADDRESS_LENGTH != 0 {
        return None
    }
    Some(
        bytes
            .chunks_exact(ADDRESS_LENGTH)
            .map(Address::from_slice)
            .collect(),
    )
}

impl Encodable for ForeignHeader {
    fn rlp_append(&self, s: &mut RlpStream) {
        self.stream_fields(s, None, &self.extra_data);
    }
}

impl Decodable for ForeignHeader {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let fields = rlp.item_count()?;
        if fields != LEGACY_FIELDS && fields != LONDON_FIELDS {
            return Err(DecoderError::RlpIncorrectListLen)
        }
        let base_fee_per_gas = if fields == LONDON_FIELDS {
            Some(rlp.val_at(15)?)
        } else {
            None
        };
        Ok(Self {
            parent_hash: rlp.val_at(0)?,
            uncle_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            state_root: rlp.val_at(3)?,
            transactions_root: rlp.val_at(4)?,
            receipts_root: rlp.val_at(5)?,
            logs_bloom: rlp.val_at(6)?,
            difficulty: rlp.val_at(7)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            timestamp: rlp.val_at(11)?,
            extra_data: rlp.val_at(12)?,
            mix_digest: rlp.val_at(13)?,
            nonce: rlp.val_at(14)?,
            base_fee_per_gas,
        })
    }
}

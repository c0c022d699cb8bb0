//! Signing keys, sealed header builders and an in-memory chain for tests.

use crate::{
    block_verifier::{
        seal_hash,
        DIFF_IN_TURN,
        DIFF_NO_TURN,
    },
    ports::HeaderReader,
};
use ethers_core::{
    k256::ecdsa::SigningKey,
    utils::secret_key_to_address,
};
use header_sync_chain_config::SealHashScheme;
use header_sync_storage::Result as StorageResult;
use header_sync_types::{
    blockchain::{
        genesis::Genesis,
        header::{
            ForeignHeader,
            EXTRA_SEAL,
        },
        stored::StoredHeader,
    },
    test_helpers::unsealed_header,
    Address,
    BlockHash,
    H256,
    U256,
};
use std::collections::HashMap;

/// A secp256k1 key of a test validator.
#[derive(Clone)]
pub struct TestKey {
    signing_key: SigningKey,
    address: Address,
}

impl core::fmt::Debug for TestKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TestKey")
            .field("address", &self.address)
            .finish()
    }
}

impl TestKey {
    /// Derives a key from a non-zero `seed`.
    pub fn from_seed(seed: u8) -> Self {
        let signing_key = SigningKey::from_slice(&[seed.max(1); 32]).expect("valid key");
        let address = secret_key_to_address(&signing_key);
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Produces a 65 byte `r || s || v` seal over the `hash`.
    pub fn sign(&self, hash: &H256) -> [u8; EXTRA_SEAL] {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_bytes())
            .expect("signing never fails for a 32 byte prehash");
        let mut seal = [0u8; EXTRA_SEAL];
        seal[..64].copy_from_slice(&signature.to_bytes());
        seal[64] = recovery_id.to_byte();
        seal
    }
}

/// `n` test keys sorted by address.
pub fn test_keys(n: u8) -> Vec<TestKey> {
    let mut keys: Vec<_> = (1..=n).map(TestKey::from_seed).collect();
    keys.sort_by_key(|key| key.address());
    keys
}

pub fn addresses(keys: &[TestKey]) -> Vec<Address> {
    keys.iter().map(TestKey::address).collect()
}

/// Writes the seal of the `key` into the extra data of the `header`.
pub fn seal(
    mut header: ForeignHeader,
    key: &TestKey,
    scheme: SealHashScheme,
    chain_id: u64,
) -> ForeignHeader {
    let hash = seal_hash(&header, scheme, chain_id);
    let len = header.extra_data.len();
    header.extra_data[len - EXTRA_SEAL..].copy_from_slice(&key.sign(&hash));
    header
}

/// An unsealed child of the `parent`, `block_period` seconds later.
pub fn child_of(
    parent: &ForeignHeader,
    block_period: u64,
    in_turn: bool,
    signers: &[Address],
) -> ForeignHeader {
    let mut header = unsealed_header(parent.number + 1, parent.hash(), signers);
    header.timestamp = parent.timestamp + block_period;
    header.gas_limit = parent.gas_limit;
    header.difficulty = U256::from(if in_turn { DIFF_IN_TURN } else { DIFF_NO_TURN });
    header
}

/// The headers of one side chain kept in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryChain {
    pub headers: HashMap<BlockHash, StoredHeader>,
    pub genesis: Option<Genesis>,
}

impl InMemoryChain {
    /// Starts the chain with the `genesis`, stored with the given `signer`.
    pub fn new(genesis: Genesis, signer: Option<Address>) -> Self {
        let stored = StoredHeader {
            header: genesis.header.clone(),
            hash: genesis.hash,
            weight: genesis.header.difficulty,
            epoch_parent_hash: None,
            signer,
        };
        let mut chain = Self {
            headers: Default::default(),
            genesis: Some(genesis),
        };
        chain.insert(stored);
        chain
    }

    pub fn insert(&mut self, header: StoredHeader) {
        self.headers.insert(header.hash, header);
    }

    pub fn get(&self, hash: &BlockHash) -> Option<&StoredHeader> {
        self.headers.get(hash)
    }
}

impl HeaderReader for InMemoryChain {
    fn header(&self, hash: &BlockHash) -> StorageResult<Option<StoredHeader>> {
        Ok(self.headers.get(hash).cloned())
    }

    fn genesis(&self) -> StorageResult<Option<Genesis>> {
        Ok(self.genesis.clone())
    }
}

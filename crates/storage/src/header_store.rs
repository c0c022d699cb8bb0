//! The mapping of the side-chain entities onto the key-value columns.
//!
//! | Column            | Key                    | Value          |
//! |-------------------|------------------------|----------------|
//! | `Headers`         | `chain_id ++ hash`     | `StoredHeader` |
//! | `CanonicalHashes` | `chain_id ++ height`   | `BlockHash`    |
//! | `Metadata`        | `chain_id`             | `u64` height   |
//! | `Genesis`         | `chain_id`             | `Genesis`      |
//!
//! Chain ids and heights are encoded as big-endian `u64`.

use crate::{
    codec::{
        postcard::Postcard,
        primitive::Primitive,
        Decode,
        Encode,
    },
    column::Column,
    kv_store::{
        KeyValueInspect,
        KeyValueMutate,
        Value,
    },
    not_found,
    Error as StorageError,
    Result as StorageResult,
};
use header_sync_types::{
    blockchain::{
        genesis::Genesis,
        primitives::{
            BlockHash,
            SideChainId,
        },
        stored::StoredHeader,
    },
    H256,
};
use std::sync::Arc;

const CHAIN_ID_LEN: usize = 8;
const HASH_LEN: usize = 32;
const HEIGHT_LEN: usize = 8;

fn chain_key(chain: SideChainId) -> Vec<u8> {
    chain.to_bytes().to_vec()
}

fn header_key(chain: SideChainId, hash: &BlockHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(CHAIN_ID_LEN + HASH_LEN);
    key.extend_from_slice(&chain.to_bytes());
    key.extend_from_slice(hash.as_bytes());
    key
}

fn height_key(chain: SideChainId, height: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(CHAIN_ID_LEN + HEIGHT_LEN);
    key.extend_from_slice(&chain.to_bytes());
    key.extend_from_slice(&height.to_be_bytes());
    key
}

fn decode_hash(value: &[u8]) -> StorageResult<BlockHash> {
    if value.len() != HASH_LEN {
        return Err(StorageError::Codec(anyhow::anyhow!(
            "block hash must be {HASH_LEN} bytes, got {}",
            value.len()
        )))
    }
    Ok(H256::from_slice(value))
}

fn postcard_value<T: serde::Serialize>(value: &T) -> StorageResult<Value> {
    Postcard::encode_as_value(value).map_err(StorageError::Codec)
}

/// The typed view over a key-value store holding the headers of every side chain.
#[derive(Clone, Debug, Default)]
pub struct HeaderStore<S> {
    storage: S,
}

impl<S> HeaderStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S> HeaderStore<S>
where
    S: KeyValueInspect<Column = Column>,
{
    /// Returns the stored header by its hash or [`StorageError::NotFound`].
    pub fn get(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<StoredHeader> {
        self.find(chain, hash)?.ok_or(not_found!(StoredHeader))
    }

    pub fn find(
        &self,
        chain: SideChainId,
        hash: &BlockHash,
    ) -> StorageResult<Option<StoredHeader>> {
        self.storage
            .get(&header_key(chain, hash), Column::Headers)?
            .map(|value| Postcard::decode_from_value(value).map_err(StorageError::Codec))
            .transpose()
    }

    pub fn contains(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<bool> {
        self.storage.exists(&header_key(chain, hash), Column::Headers)
    }

    /// Returns the canonical hash at `height` or [`StorageError::NotFound`].
    pub fn get_canonical_hash(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<BlockHash> {
        self.find_canonical_hash(chain, height)?
            .ok_or(not_found!("CanonicalHash"))
    }

    pub fn find_canonical_hash(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<Option<BlockHash>> {
        self.storage
            .get(&height_key(chain, height), Column::CanonicalHashes)?
            .map(|value| decode_hash(&value))
            .transpose()
    }

    /// Returns the current canonical height or [`StorageError::NotFound`] for an
    /// uninitialized chain.
    pub fn get_height(&self, chain: SideChainId) -> StorageResult<u64> {
        self.find_height(chain)?.ok_or(not_found!("CanonicalHeight"))
    }

    pub fn find_height(&self, chain: SideChainId) -> StorageResult<Option<u64>> {
        self.storage
            .get(&chain_key(chain), Column::Metadata)?
            .map(|value| {
                <Primitive<8> as Decode<u64>>::decode(&value).map_err(StorageError::Codec)
            })
            .transpose()
    }

    pub fn get_genesis(&self, chain: SideChainId) -> StorageResult<Genesis> {
        self.find_genesis(chain)?.ok_or(not_found!(Genesis))
    }

    pub fn find_genesis(&self, chain: SideChainId) -> StorageResult<Option<Genesis>> {
        self.storage
            .get(&chain_key(chain), Column::Genesis)?
            .map(|value| Postcard::decode_from_value(value).map_err(StorageError::Codec))
            .transpose()
    }
}

impl<S> HeaderStore<S>
where
    S: KeyValueMutate<Column = Column>,
{
    /// Inserts the header. Writing the same header twice is a no-op.
    pub fn put(
        &mut self,
        chain: SideChainId,
        hash: &BlockHash,
        header: &StoredHeader,
    ) -> StorageResult<()> {
        let value = postcard_value(header)?;
        self.storage
            .put(&header_key(chain, hash), Column::Headers, value)
    }

    pub fn put_canonical(
        &mut self,
        chain: SideChainId,
        height: u64,
        hash: &BlockHash,
    ) -> StorageResult<()> {
        self.storage.put(
            &height_key(chain, height),
            Column::CanonicalHashes,
            Arc::new(hash.as_bytes().to_vec()),
        )
    }

    pub fn delete_canonical(&mut self, chain: SideChainId, height: u64) -> StorageResult<()> {
        self.storage
            .delete(&height_key(chain, height), Column::CanonicalHashes)
    }

    pub fn put_height(&mut self, chain: SideChainId, height: u64) -> StorageResult<()> {
        let value = <Primitive<8> as Encode<u64>>::encode_as_value(&height)
            .map_err(StorageError::Codec)?;
        self.storage.put(&chain_key(chain), Column::Metadata, value)
    }

    pub fn put_genesis(&mut self, chain: SideChainId, genesis: &Genesis) -> StorageResult<()> {
        let value = postcard_value(genesis)?;
        self.storage.put(&chain_key(chain), Column::Genesis, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        in_memory::MemoryStore,
        IsNotFound,
    };
    use header_sync_types::{
        test_helpers::unsealed_header,
        U256,
    };
    use test_case::test_case;

    const CHAIN: SideChainId = SideChainId::new(97);
    const OTHER_CHAIN: SideChainId = SideChainId::new(56);

    fn stored(number: u64) -> StoredHeader {
        let header = unsealed_header(number, H256::repeat_byte(number as u8), &[]);
        StoredHeader {
            hash: header.hash(),
            weight: U256::from(number * 2),
            header,
            epoch_parent_hash: None,
            signer: None,
        }
    }

    fn store() -> HeaderStore<MemoryStore> {
        HeaderStore::new(MemoryStore::default())
    }

    #[test]
    fn header_round_trips_and_is_namespaced() {
        let mut store = store();
        let header = stored(5);

        store.put(CHAIN, &header.hash, &header).unwrap();

        assert_eq!(store.get(CHAIN, &header.hash).unwrap(), header);
        assert!(store.contains(CHAIN, &header.hash).unwrap());
        assert!(!store.contains(OTHER_CHAIN, &header.hash).unwrap());
        assert!(store.get(OTHER_CHAIN, &header.hash).is_not_found());
    }

    #[test]
    fn put_is_idempotent() {
        let mut store = store();
        let header = stored(5);

        store.put(CHAIN, &header.hash, &header).unwrap();
        store.put(CHAIN, &header.hash, &header).unwrap();

        assert_eq!(store.storage().len(Column::Headers), 1);
    }

    #[test]
    fn canonical_index_can_be_rewritten_and_deleted() {
        let mut store = store();
        let first = H256::repeat_byte(1);
        let second = H256::repeat_byte(2);

        store.put_canonical(CHAIN, 10, &first).unwrap();
        assert_eq!(store.get_canonical_hash(CHAIN, 10).unwrap(), first);

        store.put_canonical(CHAIN, 10, &second).unwrap();
        assert_eq!(store.get_canonical_hash(CHAIN, 10).unwrap(), second);

        store.delete_canonical(CHAIN, 10).unwrap();
        assert!(store.get_canonical_hash(CHAIN, 10).is_not_found());
        assert_eq!(store.find_canonical_hash(CHAIN, 10).unwrap(), None);
    }

    #[test_case(0; "zero")]
    #[test_case(400; "small")]
    #[test_case(u64::MAX; "max")]
    fn height_is_stored_per_chain(height: u64) {
        let mut store = store();

        assert!(store.get_height(CHAIN).is_not_found());
        store.put_height(CHAIN, height).unwrap();

        assert_eq!(store.get_height(CHAIN).unwrap(), height);
        assert_eq!(store.find_height(OTHER_CHAIN).unwrap(), None);
    }

    #[test]
    fn genesis_is_stored_per_chain() {
        let mut store = store();
        let header = unsealed_header(400, H256::zero(), &[]);
        let genesis = Genesis {
            hash: header.hash(),
            header,
            epochs: vec![],
        };

        store.put_genesis(CHAIN, &genesis).unwrap();

        assert_eq!(store.get_genesis(CHAIN).unwrap(), genesis);
        assert!(store.get_genesis(OTHER_CHAIN).is_not_found());
    }

    #[test]
    fn corrupted_values_are_codec_errors() {
        let mut store = store();
        store
            .storage_mut()
            .put(&height_key(CHAIN, 1), Column::CanonicalHashes, Arc::new(vec![1, 2]))
            .unwrap();
        store
            .storage_mut()
            .put(&chain_key(CHAIN), Column::Metadata, Arc::new(vec![1]))
            .unwrap();

        assert!(matches!(
            store.get_canonical_hash(CHAIN, 1),
            Err(StorageError::Codec(_))
        ));
        assert!(matches!(store.get_height(CHAIN), Err(StorageError::Codec(_))));
    }

    #[test]
    fn canonical_keys_sort_by_height() {
        assert!(height_key(CHAIN, 255) < height_key(CHAIN, 256));
        assert!(height_key(OTHER_CHAIN, u64::MAX) < height_key(CHAIN, 0));
    }
}

//! Read-only queries over the canonical chain of every side chain.

use crate::chain_view::ChainView;
use header_sync_consensus::ports::HeaderReader;
use header_sync_storage::{
    cache::HeaderCache,
    column::Column,
    header_store::HeaderStore,
    kv_store::KeyValueInspect,
    Result as StorageResult,
};
use header_sync_types::{
    blockchain::{
        genesis::Genesis,
        stored::StoredHeader,
    },
    BlockHash,
    SideChainId,
};
use std::sync::Arc;

/// The queries used by the consumers of the canonical chains, like deposit proof
/// verification. Reads the committed store only, so it fills the `cache` on misses.
pub struct CanonicalChainQuery<'a, S> {
    store: &'a HeaderStore<S>,
    cache: &'a HeaderCache,
}

impl<'a, S> CanonicalChainQuery<'a, S>
where
    S: KeyValueInspect<Column = Column>,
{
    pub fn new(store: &'a HeaderStore<S>, cache: &'a HeaderCache) -> Self {
        Self { store, cache }
    }

    /// The height of the canonical head, or zero if the chain is not initialized.
    pub fn get_canonical_height(&self, chain: SideChainId) -> StorageResult<u64> {
        Ok(self.store.find_height(chain)?.unwrap_or_default())
    }

    pub fn get_canonical_hash(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<BlockHash> {
        self.store.get_canonical_hash(chain, height)
    }

    pub fn get_header_by_height(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<StoredHeader> {
        let hash = self.get_canonical_hash(chain, height)?;
        self.get_header_by_hash(chain, &hash)
    }

    /// Returns any stored header, canonical or not.
    pub fn get_header_by_hash(
        &self,
        chain: SideChainId,
        hash: &BlockHash,
    ) -> StorageResult<StoredHeader> {
        if let Some(header) = self.cache.header(chain, hash) {
            return Ok(header.as_ref().clone())
        }
        let header = self.store.get(chain, hash)?;
        self.cache.insert_header(chain, Arc::new(header.clone()));
        Ok(header)
    }

    pub fn is_header_known(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<bool> {
        ChainView::new(chain, self.store, self.cache).contains(hash)
    }

    /// Returns `true` if the header `hash` is on the canonical chain.
    pub fn is_canonical(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<bool> {
        let Some(header) = ChainView::new(chain, self.store, self.cache).header(hash)? else {
            return Ok(false)
        };
        Ok(self.store.find_canonical_hash(chain, header.number())? == Some(*hash))
    }

    /// The number of canonical headers built on top of the header `hash`, or
    /// `None` if the header is not canonical.
    pub fn confirmations(
        &self,
        chain: SideChainId,
        hash: &BlockHash,
    ) -> StorageResult<Option<u64>> {
        let Some(header) = ChainView::new(chain, self.store, self.cache).header(hash)? else {
            return Ok(None)
        };
        let number = header.number();
        if self.store.find_canonical_hash(chain, number)? != Some(*hash) {
            return Ok(None)
        }
        let height = self.get_canonical_height(chain)?;
        Ok(Some(height.saturating_sub(number)))
    }

    pub fn get_genesis(&self, chain: SideChainId) -> StorageResult<Genesis> {
        if let Some(genesis) = self.cache.genesis(chain) {
            return Ok(genesis.as_ref().clone())
        }
        let genesis = self.store.get_genesis(chain)?;
        self.cache.insert_genesis(chain, Arc::new(genesis.clone()));
        Ok(genesis)
    }
}

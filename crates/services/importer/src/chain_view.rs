//! Read access to the headers of one side chain for the consensus verifiers.

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

/// The headers of the `chain` as seen through the `store`, with committed
/// headers served from the `cache` when possible.
///
/// The view never fills the cache: the store may be an uncommitted transaction.
pub struct ChainView<'a, S> {
    chain: SideChainId,
    store: &'a HeaderStore<S>,
    cache: &'a HeaderCache,
}

impl<'a, S> ChainView<'a, S> {
    pub fn new(chain: SideChainId, store: &'a HeaderStore<S>, cache: &'a HeaderCache) -> Self {
        Self {
            chain,
            store,
            cache,
        }
    }
}

impl<S> ChainView<'_, S>
where
    S: KeyValueInspect<Column = Column>,
{
    pub fn contains(&self, hash: &BlockHash) -> StorageResult<bool> {
        if self.cache.header(self.chain, hash).is_some() {
            return Ok(true)
        }
        self.store.contains(self.chain, hash)
    }
}

impl<S> HeaderReader for ChainView<'_, S>
where
    S: KeyValueInspect<Column = Column>,
{
    fn header(&self, hash: &BlockHash) -> StorageResult<Option<StoredHeader>> {
        if let Some(header) = self.cache.header(self.chain, hash) {
            return Ok(Some(header.as_ref().clone()))
        }
        self.store.find(self.chain, hash)
    }

    fn genesis(&self) -> StorageResult<Option<Genesis>> {
        if let Some(genesis) = self.cache.genesis(self.chain) {
            return Ok(Some(genesis.as_ref().clone()))
        }
        self.store.find_genesis(self.chain)
    }
}

//! The bounded cache of committed headers and genesis records.
//!
//! Entries are inserted only after they reach the committed store, and stored
//! headers are immutable by hash, so a hit always equals the committed value.

use header_sync_types::blockchain::{
    genesis::Genesis,
    primitives::{
        BlockHash,
        SideChainId,
    },
    stored::StoredHeader,
};
use lru::LruCache;
use parking_lot::Mutex;
use std::{
    num::NonZeroUsize,
    sync::Arc,
};

/// The LRU cache of committed chain data. A cache built with zero capacity is
/// disabled and never holds an entry.
#[derive(Debug)]
pub struct HeaderCache {
    headers: Option<Mutex<LruCache<(SideChainId, BlockHash), Arc<StoredHeader>>>>,
    genesis: Mutex<LruCache<SideChainId, Arc<Genesis>>>,
}

/// The number of genesis records kept when the header cache is enabled.
const GENESIS_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

impl HeaderCache {
    pub fn new(capacity: usize) -> Self {
        let genesis_capacity = if capacity == 0 {
            NonZeroUsize::MIN
        } else {
            GENESIS_CAPACITY
        };
        Self {
            headers: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            genesis: Mutex::new(LruCache::new(genesis_capacity)),
        }
    }

    /// The cache that never holds an entry.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.headers.is_some()
    }

    pub fn header(&self, chain: SideChainId, hash: &BlockHash) -> Option<Arc<StoredHeader>> {
        self.headers
            .as_ref()?
            .lock()
            .get(&(chain, *hash))
            .cloned()
    }

    pub fn insert_header(&self, chain: SideChainId, header: Arc<StoredHeader>) {
        if let Some(headers) = &self.headers {
            headers.lock().put((chain, header.hash), header);
        }
    }

    pub fn genesis(&self, chain: SideChainId) -> Option<Arc<Genesis>> {
        if !self.is_enabled() {
            return None
        }
        self.genesis.lock().get(&chain).cloned()
    }

    pub fn insert_genesis(&self, chain: SideChainId, genesis: Arc<Genesis>) {
        if self.is_enabled() {
            self.genesis.lock().put(chain, genesis);
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Some(headers) = &self.headers {
            headers.lock().clear();
        }
        self.genesis.lock().clear();
    }

    /// The number of cached headers.
    pub fn len(&self) -> usize {
        self.headers
            .as_ref()
            .map(|headers| headers.lock().len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HeaderCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use header_sync_types::H256;

    const CHAIN: SideChainId = SideChainId::new(1);

    fn header(byte: u8) -> Arc<StoredHeader> {
        Arc::new(StoredHeader {
            hash: H256::repeat_byte(byte),
            ..Default::default()
        })
    }

    #[test]
    fn least_recently_used_header_is_evicted() {
        let cache = HeaderCache::new(2);
        cache.insert_header(CHAIN, header(1));
        cache.insert_header(CHAIN, header(2));
        assert!(cache.header(CHAIN, &H256::repeat_byte(1)).is_some());

        cache.insert_header(CHAIN, header(3));

        assert!(cache.header(CHAIN, &H256::repeat_byte(1)).is_some());
        assert!(cache.header(CHAIN, &H256::repeat_byte(2)).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entries_are_namespaced_by_chain() {
        let cache = HeaderCache::default();
        cache.insert_header(CHAIN, header(1));

        assert!(cache
            .header(SideChainId::new(2), &H256::repeat_byte(1))
            .is_none());
    }

    #[test]
    fn disabled_cache_holds_nothing() {
        let cache = HeaderCache::disabled();
        cache.insert_header(CHAIN, header(1));
        cache.insert_genesis(CHAIN, Arc::new(Genesis::default()));

        assert!(cache.is_empty());
        assert!(cache.genesis(CHAIN).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = HeaderCache::default();
        cache.insert_header(CHAIN, header(1));
        cache.insert_genesis(CHAIN, Arc::new(Genesis::default()));

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.genesis(CHAIN).is_none());
    }
}

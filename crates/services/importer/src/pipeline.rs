//! Admission of headers into one side chain:
//! `received -> deduplicated | parent missing | verified -> weighted -> canonical | non-canonical`.

use crate::{
    chain_view::ChainView,
    Error,
};
use header_sync_consensus::{
    ports::HeaderReader,
    ConsensusVerifier,
};
use header_sync_storage::{
    cache::HeaderCache,
    column::Column,
    header_store::HeaderStore,
    kv_store::KeyValueMutate,
    not_found,
    Result as StorageResult,
};
use header_sync_types::{
    blockchain::{
        header::ForeignHeader,
        stored::StoredHeader,
    },
    BlockHash,
    SideChainId,
    Weight,
};
use std::sync::Arc;


/// What happened to one submitted header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The header was already stored.
    Duplicate,
    /// The parent is unknown, the header was skipped.
    ParentMissing,
    /// The header was stored on a branch lighter than, or as heavy as, the canonical one.
    NonCanonical { number: u64, hash: BlockHash },
    /// The header became the canonical head. `reorg_depth` counts the heights
    /// whose canonical entry was replaced or removed.
    Canonical {
        number: u64,
        hash: BlockHash,
        reorg_depth: u64,
    },
}

/// The summary of an admitted batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub duplicates: usize,
    pub orphans: usize,
    pub non_canonical: usize,
    pub canonical: usize,
    /// The canonical head after the batch, if the batch moved it.
    pub head: Option<(u64, BlockHash)>,
    /// The deepest reorg performed by the batch.
    pub reorg_depth: u64,
    /// The headers the batch stored, in admission order.
    pub stored: Vec<Arc<StoredHeader>>,
}

impl BatchOutcome {
    /// The number of newly stored headers.
    pub fn admitted(&self) -> usize {
        self.stored.len()
    }

    fn record(&mut self, admission: &Admission) {
        match admission {
            Admission::Duplicate => self.duplicates += 1,
            Admission::ParentMissing => self.orphans += 1,
            Admission::NonCanonical { .. } => self.non_canonical += 1,
            Admission::Canonical {
                number,
                hash,
                reorg_depth,
            } => {
                self.canonical += 1;
                self.head = Some((*number, *hash));
                self.reorg_depth = self.reorg_depth.max(*reorg_depth);
            }
        }
    }
}

/// Admits headers of the side chain `chain` verified by `V`.
pub struct AdmissionPipeline<'a, V: ?Sized> {
    chain: SideChainId,
    verifier: &'a V,
    cache: &'a HeaderCache,
}

impl<'a, V> AdmissionPipeline<'a, V>
where
    V: ConsensusVerifier + ?Sized,
{
    pub fn new(chain: SideChainId, verifier: &'a V, cache: &'a HeaderCache) -> Self {
        Self {
            chain,
            verifier,
            cache,
        }
    }

    /// Admits the `headers` in order. The first failure aborts the batch; the
    /// caller is expected to drop the changes made to the `store`.
    pub fn admit_batch<S>(
        &self,
        store: &mut HeaderStore<S>,
        headers: Vec<ForeignHeader>,
        now: u64,
    ) -> Result<BatchOutcome, Error>
    where
        S: KeyValueMutate<Column = Column>,
    {
        let mut outcome = BatchOutcome::default();
        for header in headers {
            let (admission, stored) = self.admit_inner(store, header, now)?;
            outcome.record(&admission);
            outcome.stored.extend(stored);
        }
        Ok(outcome)
    }

    /// Admits a single header.
    pub fn admit<S>(
        &self,
        store: &mut HeaderStore<S>,
        header: ForeignHeader,
        now: u64,
    ) -> Result<Admission, Error>
    where
        S: KeyValueMutate<Column = Column>,
    {
        self.admit_inner(store, header, now)
            .map(|(admission, _)| admission)
    }

    fn admit_inner<S>(
        &self,
        store: &mut HeaderStore<S>,
        header: ForeignHeader,
        now: u64,
    ) -> Result<(Admission, Option<Arc<StoredHeader>>), Error>
    where
        S: KeyValueMutate<Column = Column>,
    {
        let hash = header.hash();
        let number = header.number;
        let view = ChainView::new(self.chain, store, self.cache);

        if view.contains(&hash)? {
            tracing::debug!("Header {number} {hash:?} is already known");
            return Ok((Admission::Duplicate, None))
        }
        let Some(parent) = view.header(&header.parent_hash)? else {
            tracing::debug!(
                "Skipping header {number} {hash:?}: parent {:?} is unknown",
                header.parent_hash
            );
            return Ok((Admission::ParentMissing, None))
        };

        let verified = self
            .verifier
            .verify(&view, &header, &parent, now)
            .map_err(|err| {
                tracing::warn!("Rejected header {number} {hash:?}: {err}");
                Error::from(err)
            })?;

        let weight = parent
            .weight
            .checked_add(header.difficulty)
            .ok_or(Error::Overflow)?;
        let stored = StoredHeader {
            header,
            hash,
            weight,
            epoch_parent_hash: Some(verified.epoch_parent_hash),
            signer: Some(verified.signer),
        };
        store.put(self.chain, &hash, &stored)?;

        let admission = self.fork_choice(store, &stored)?;
        Ok((admission, Some(Arc::new(stored))))
    }

    /// Makes the `stored` header the canonical head if its branch is strictly
    /// heavier than the canonical one.
    fn fork_choice<S>(
        &self,
        store: &mut HeaderStore<S>,
        stored: &StoredHeader,
    ) -> Result<Admission, Error>
    where
        S: KeyValueMutate<Column = Column>,
    {
        let chain = self.chain;
        let number = stored.number();
        let hash = stored.hash;

        let head_height = store.get_height(chain)?;
        let head_weight = self.weight_at(store, head_height)?;
        if stored.weight <= head_weight {
            tracing::debug!(
                "Header {number} {hash:?} stays off the canonical chain, weight {} <= {head_weight}",
                stored.weight
            );
            return Ok(Admission::NonCanonical { number, hash })
        }

        let mut reorg_depth = 0;
        for height in number.saturating_add(1)..=head_height {
            store.delete_canonical(chain, height)?;
            reorg_depth += 1;
        }
        if number <= head_height {
            reorg_depth += 1;
        }

        let genesis_number = ChainView::new(chain, store, self.cache)
            .genesis()?
            .ok_or(not_found!("Genesis"))?
            .number();
        let mut cursor_hash = *stored.parent_hash();
        let mut cursor_number = number.saturating_sub(1);
        while cursor_number > genesis_number {
            if store.find_canonical_hash(chain, cursor_number)? == Some(cursor_hash) {
                break
            }
            store.put_canonical(chain, cursor_number, &cursor_hash)?;
            reorg_depth += 1;
            cursor_hash = *self.header(store, &cursor_hash)?.parent_hash();
            cursor_number -= 1;
        }

        store.put_canonical(chain, number, &hash)?;
        store.put_height(chain, number)?;

        if reorg_depth > 0 {
            tracing::info!(
                "Reorganized side chain {chain} to {number} {hash:?}, depth {reorg_depth}"
            );
        }
        Ok(Admission::Canonical {
            number,
            hash,
            reorg_depth,
        })
    }

    fn weight_at<S>(&self, store: &HeaderStore<S>, height: u64) -> StorageResult<Weight>
    where
        S: KeyValueMutate<Column = Column>,
    {
        let hash = store.get_canonical_hash(self.chain, height)?;
        Ok(self.header(store, &hash)?.weight)
    }

    fn header<S>(&self, store: &HeaderStore<S>, hash: &BlockHash) -> StorageResult<StoredHeader>
    where
        S: KeyValueMutate<Column = Column>,
    {
        ChainView::new(self.chain, store, self.cache)
            .header(hash)?
            .ok_or(not_found!(StoredHeader))
    }
}

//! Verification of Clique-style chains, where the signers vote on adding and
//! removing signers and every header is checked against the signer snapshot of
//! its parent.

use crate::{
    block_verifier::{
        epoch_parent_hash,
        recover_signer,
        verify_cascading_fields,
        verify_constant_fields,
        verify_difficulty_sentinel,
        verify_extra_layout,
        verify_timestamp,
        verify_turn_difficulty,
        ConsensusVerifier,
        Verified,
    },
    error::{
        Error,
        VerifyError,
    },
    ports::{
        HeaderReader,
        SignerRecovery,
    },
};
use header_sync_chain_config::{
    SideChainConfig,
    VotingParams,
};
use header_sync_types::{
    blockchain::{
        genesis::{
            Genesis,
            GenesisBundle,
        },
        header::{
            parse_signer_list,
            ForeignHeader,
        },
        stored::StoredHeader,
    },
    Address,
    BlockHash,
};
use itertools::Itertools;
use lru::LruCache;
use parking_lot::Mutex;
use std::{
    num::NonZeroUsize,
    sync::Arc,
};

mod snapshot;

pub use snapshot::{
    Snapshot,
    Tally,
    Vote,
    NONCE_AUTH,
    NONCE_DROP,
};

pub struct VotingSnapshot {
    config: SideChainConfig,
    recovery: Arc<dyn SignerRecovery>,
    snapshots: Option<Mutex<LruCache<BlockHash, Snapshot>>>,
}

impl VotingSnapshot {
    pub fn new(
        config: SideChainConfig,
        params: VotingParams,
        recovery: Arc<dyn SignerRecovery>,
    ) -> Self {
        let snapshots = NonZeroUsize::new(params.snapshot_cache)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));
        Self {
            config,
            recovery,
            snapshots,
        }
    }

    /// Returns the snapshot after the stored header `hash`.
    pub fn snapshot(
        &self,
        chain: &dyn HeaderReader,
        hash: &BlockHash,
    ) -> Result<Snapshot, Error> {
        let header = chain.header(hash)?.ok_or_else(|| {
            Error::epoch_resolution(format!("the header {hash:?} is not stored"))
        })?;
        self.snapshot_of(chain, &header)
    }

    fn cached(&self, hash: &BlockHash) -> Option<Snapshot> {
        self.snapshots.as_ref()?.lock().get(hash).cloned()
    }

    fn remember(&self, snapshot: &Snapshot) {
        if let Some(snapshots) = &self.snapshots {
            snapshots.lock().put(snapshot.hash, snapshot.clone());
        }
    }

    fn fetch(&self, chain: &dyn HeaderReader, hash: &BlockHash) -> Result<StoredHeader, Error> {
        chain.header(hash)?.ok_or_else(|| {
            Error::epoch_resolution(format!("the ancestor {hash:?} is not stored"))
        })
    }

    /// Walks back from `head` to the nearest cached snapshot, checkpoint or genesis
    /// and replays the headers in between.
    fn snapshot_of(
        &self,
        chain: &dyn HeaderReader,
        head: &StoredHeader,
    ) -> Result<Snapshot, Error> {
        let genesis = chain
            .genesis()?
            .ok_or_else(|| Error::epoch_resolution("the side chain has no genesis"))?;
        let epoch_length = self.config.epoch_length;

        let mut pending = Vec::new();
        let mut cursor = head.clone();
        let base = loop {
            if let Some(snapshot) = self.cached(&cursor.hash) {
                break snapshot
            }
            if cursor.hash == genesis.hash {
                let signers = checkpoint_signers(&genesis.header)?;
                break Snapshot::new(genesis.number(), genesis.hash, signers)
            }
            if cursor.number() <= genesis.number() {
                return Err(Error::epoch_resolution(format!(
                    "the ancestry of {:?} doesn't lead to the genesis",
                    head.hash
                )))
            }
            if cursor.header.is_checkpoint(epoch_length) {
                let signers = checkpoint_signers(&cursor.header)?;
                let mut snapshot = Snapshot::new(cursor.number(), cursor.hash, signers);
                self.seed_recents(chain, &mut snapshot, &cursor, genesis.number())?;
                break snapshot
            }
            if pending.len() as u64 >= epoch_length {
                return Err(Error::epoch_resolution(format!(
                    "no checkpoint within {epoch_length} headers below {}",
                    head.number()
                )))
            }
            let parent = self.fetch(chain, cursor.parent_hash())?;
            pending.push(cursor);
            cursor = parent;
        };

        pending.reverse();
        let snapshot = base.apply(&pending, epoch_length)?;
        self.remember(&snapshot);
        Ok(snapshot)
    }

    /// Records the signers of the checkpoint and the `⌊n/2⌋` headers preceding it.
    fn seed_recents(
        &self,
        chain: &dyn HeaderReader,
        snapshot: &mut Snapshot,
        checkpoint: &StoredHeader,
        genesis_number: u64,
    ) -> Result<(), Error> {
        let mut cursor = checkpoint.clone();
        for _ in 0..=snapshot.signers.len() / 2 {
            if cursor.number() <= genesis_number {
                break
            }
            if let Some(signer) = cursor.signer {
                snapshot.recents.insert(cursor.number(), signer);
            }
            cursor = self.fetch(chain, cursor.parent_hash())?;
        }
        Ok(())
    }

    fn seal_hash(&self, header: &ForeignHeader) -> header_sync_types::H256 {
        header.seal_hash(None)
    }
}

fn checkpoint_signers(header: &ForeignHeader) -> Result<Vec<Address>, Error> {
    header
        .signer_bytes()
        .and_then(parse_signer_list)
        .filter(|signers| !signers.is_empty())
        .ok_or_else(|| VerifyError::InvalidSignerList.into())
}

impl ConsensusVerifier for VotingSnapshot {
    fn verify(
        &self,
        chain: &dyn HeaderReader,
        header: &ForeignHeader,
        parent: &StoredHeader,
        now: u64,
    ) -> Result<Verified, Error> {
        let checkpoint = header.is_checkpoint(self.config.epoch_length);
        verify_timestamp(header, now, self.config.allowed_future_drift)?;
        if checkpoint {
            if !header.coinbase.is_zero() || header.nonce != NONCE_DROP {
                return Err(VerifyError::InvalidCheckpointVote.into())
            }
        } else if header.nonce != NONCE_AUTH && header.nonce != NONCE_DROP {
            return Err(VerifyError::InvalidVote.into())
        }
        let announced = verify_extra_layout(header, checkpoint)?;
        verify_constant_fields(header)?;
        verify_difficulty_sentinel(header)?;
        verify_cascading_fields(&self.config, header, &parent.header)?;

        let snapshot = self.snapshot_of(chain, parent)?;
        if checkpoint && announced.into_iter().sorted().collect_vec() != snapshot.signers_sorted()
        {
            return Err(VerifyError::MismatchingCheckpointSigners.into())
        }

        let signer = recover_signer(self.recovery.as_ref(), header, &self.seal_hash(header))?;
        if !snapshot.signers.contains(&signer) {
            return Err(VerifyError::UnauthorizedSigner(signer).into())
        }
        if snapshot.recently_signed(header.number, &signer) {
            return Err(VerifyError::RecentlySigned(signer).into())
        }
        verify_turn_difficulty(header, snapshot.in_turn(header.number, &signer))?;

        Ok(Verified {
            signer,
            epoch_parent_hash: epoch_parent_hash(parent, self.config.epoch_length),
        })
    }

    fn validate_genesis(&self, bundle: &GenesisBundle) -> Result<Genesis, Error> {
        let header = &bundle.header;
        verify_extra_layout(header, true)?;
        if !bundle.epochs.is_empty() {
            tracing::warn!(
                "Ignoring {} validator epochs supplied with a voting genesis",
                bundle.epochs.len()
            );
        }
        Ok(Genesis {
            header: header.clone(),
            hash: header.hash(),
            epochs: vec![],
        })
    }

    fn genesis_signer(&self, header: &ForeignHeader) -> Option<Address> {
        recover_signer(self.recovery.as_ref(), header, &self.seal_hash(header)).ok()
    }
}

//! The façade the relay chain dispatches header sync transactions to.

use crate::{
    genesis::GenesisBootstrap,
    pipeline::{
        AdmissionPipeline,
        BatchOutcome,
    },
    ports::OperatorWitness,
    query::CanonicalChainQuery,
    Config,
    Error,
};
use header_sync_chain_config::SideChainConfigProvider;
use header_sync_consensus::{
    ports::{
        Clock,
        Secp256k1Recovery,
        SignerRecovery,
        SystemClock,
    },
    ChainVerifier,
};
use header_sync_storage::{
    cache::HeaderCache,
    column::Column,
    header_store::HeaderStore,
    kv_store::BatchOperations,
    transactional::StorageTransaction,
    Result as StorageResult,
};
use header_sync_types::{
    blockchain::{
        genesis::{
            Genesis,
            GenesisBundle,
        },
        header::ForeignHeader,
        stored::StoredHeader,
    },
    services::header_sync::{
        SyncBlockHeadersParam,
        SyncGenesisHeaderParam,
    },
    Address,
    BlockHash,
    SideChainId,
};
use std::{
    collections::HashMap,
    sync::Arc,
};


/// Owns the header store of the side chains and admits the submitted headers.
///
/// Every batch runs inside of one [`StorageTransaction`]: a failing header
/// discards the whole batch and leaves the store untouched.
pub struct HeaderSyncEngine<S, P, W> {
    store: HeaderStore<S>,
    configs: P,
    witness: W,
    recovery: Arc<dyn SignerRecovery>,
    clock: Arc<dyn Clock>,
    cache: HeaderCache,
    /// The verifier of every chain seen so far, built from its config on first use.
    verifiers: HashMap<SideChainId, Arc<ChainVerifier>>,
}

impl<S, P, W> HeaderSyncEngine<S, P, W>
where
    S: BatchOperations<Column = Column>,
    P: SideChainConfigProvider,
    W: OperatorWitness,
{
    pub fn new(config: Config, storage: S, configs: P, witness: W) -> Self {
        Self {
            store: HeaderStore::new(storage),
            configs,
            witness,
            recovery: Arc::new(Secp256k1Recovery),
            clock: Arc::new(SystemClock),
            cache: HeaderCache::new(config.header_cache_size),
            verifiers: HashMap::new(),
        }
    }

    pub fn with_recovery(mut self, recovery: Arc<dyn SignerRecovery>) -> Self {
        self.recovery = recovery;
        self.verifiers.clear();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &HeaderStore<S> {
        &self.store
    }

    pub fn cache(&self) -> &HeaderCache {
        &self.cache
    }

    fn verifier(&mut self, chain: SideChainId) -> Result<Arc<ChainVerifier>, Error> {
        if let Some(verifier) = self.verifiers.get(&chain) {
            return Ok(verifier.clone())
        }
        let config = self.configs.side_chain_config(chain)?;
        tracing::debug!(
            "Side chain {chain} uses the {} consensus",
            config.consensus.name()
        );
        let verifier = Arc::new(ChainVerifier::from_config(config, self.recovery.clone()));
        self.verifiers.insert(chain, verifier.clone());
        Ok(verifier)
    }

    /// Bootstraps the side chain `chain` from the operator submitted `bundle`.
    #[tracing::instrument(skip_all, fields(chain = %chain), err)]
    pub fn sync_genesis_header(
        &mut self,
        chain: SideChainId,
        bundle: &GenesisBundle,
        tx_signers: &[Address],
    ) -> Result<Genesis, Error> {
        let verifier = self.verifier(chain)?;
        let mut transaction = HeaderStore::new(StorageTransaction::new(self.store.storage_mut()));
        let genesis = GenesisBootstrap::new(chain, verifier.as_ref()).sync_genesis(
            &mut transaction,
            &self.witness,
            tx_signers,
            bundle,
        )?;
        transaction.into_inner().commit()?;

        self.cache.insert_genesis(chain, Arc::new(genesis.clone()));
        Ok(genesis)
    }

    /// Admits a batch of headers of the side chain `chain`. Either every header
    /// is processed or the store stays as it was.
    #[tracing::instrument(skip_all, fields(chain = %chain, headers = headers.len()), err)]
    pub fn sync_block_headers(
        &mut self,
        chain: SideChainId,
        headers: Vec<ForeignHeader>,
    ) -> Result<BatchOutcome, Error> {
        let verifier = self.verifier(chain)?;
        let now = self.clock.now();
        let mut transaction = HeaderStore::new(StorageTransaction::new(self.store.storage_mut()));
        let outcome = AdmissionPipeline::new(chain, verifier.as_ref(), &self.cache)
            .admit_batch(&mut transaction, headers, now)?;
        transaction.into_inner().commit()?;

        for stored in &outcome.stored {
            self.cache.insert_header(chain, stored.clone());
        }
        tracing::info!(
            admitted = outcome.admitted(),
            duplicates = outcome.duplicates,
            orphans = outcome.orphans,
            reorg_depth = outcome.reorg_depth,
            "Committed headers of side chain {chain}, head {:?}",
            outcome.head
        );
        Ok(outcome)
    }

    /// Handles the postcard encoded [`SyncGenesisHeaderParam`] envelope.
    pub fn handle_sync_genesis(
        &mut self,
        bytes: &[u8],
        tx_signers: &[Address],
    ) -> Result<Genesis, Error> {
        let param = SyncGenesisHeaderParam::decode(bytes).map_err(Error::deserialize)?;
        let bundle =
            GenesisBundle::from_json(&param.genesis_header).map_err(Error::deserialize)?;
        self.sync_genesis_header(param.side_chain_id(), &bundle, tx_signers)
    }

    /// Handles the postcard encoded [`SyncBlockHeadersParam`] envelope.
    pub fn handle_sync_headers(&mut self, bytes: &[u8]) -> Result<BatchOutcome, Error> {
        let param = SyncBlockHeadersParam::decode(bytes).map_err(Error::deserialize)?;
        let headers = param
            .headers
            .iter()
            .map(|encoded| ForeignHeader::decode(encoded))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::deserialize)?;
        self.sync_block_headers(param.side_chain_id(), headers)
    }

    pub fn query(&self) -> CanonicalChainQuery<'_, S> {
        CanonicalChainQuery::new(&self.store, &self.cache)
    }

    pub fn get_canonical_height(&self, chain: SideChainId) -> StorageResult<u64> {
        self.query().get_canonical_height(chain)
    }

    pub fn get_canonical_hash(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<BlockHash> {
        self.query().get_canonical_hash(chain, height)
    }

    pub fn get_header_by_height(
        &self,
        chain: SideChainId,
        height: u64,
    ) -> StorageResult<StoredHeader> {
        self.query().get_header_by_height(chain, height)
    }

    pub fn get_header_by_hash(
        &self,
        chain: SideChainId,
        hash: &BlockHash,
    ) -> StorageResult<StoredHeader> {
        self.query().get_header_by_hash(chain, hash)
    }

    pub fn is_header_known(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<bool> {
        self.query().is_header_known(chain, hash)
    }

    pub fn is_canonical(&self, chain: SideChainId, hash: &BlockHash) -> StorageResult<bool> {
        self.query().is_canonical(chain, hash)
    }

    pub fn confirmations(
        &self,
        chain: SideChainId,
        hash: &BlockHash,
    ) -> StorageResult<Option<u64>> {
        self.query().confirmations(chain, hash)
    }

    pub fn get_genesis(&self, chain: SideChainId) -> StorageResult<Genesis> {
        self.query().get_genesis(chain)
    }
}

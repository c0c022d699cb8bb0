//! The one-time bootstrap of a side chain from an operator supplied trust anchor.

use crate::{
    ports::OperatorWitness,
    Error,
};
use header_sync_consensus::ConsensusVerifier;
use header_sync_storage::{
    column::Column,
    header_store::HeaderStore,
    kv_store::KeyValueMutate,
};
use header_sync_types::{
    blockchain::{
        genesis::{
            Genesis,
            GenesisBundle,
        },
        stored::StoredHeader,
    },
    Address,
    SideChainId,
};

pub struct GenesisBootstrap<'a, V: ?Sized> {
    chain: SideChainId,
    verifier: &'a V,
}

impl<'a, V> GenesisBootstrap<'a, V>
where
    V: ConsensusVerifier + ?Sized,
{
    pub fn new(chain: SideChainId, verifier: &'a V) -> Self {
        Self { chain, verifier }
    }

    /// Writes the genesis of the side chain and makes its header the canonical head.
    ///
    /// Fails with [`Error::OperatorAuthError`] unless the `witness` finds the
    /// operator among the `tx_signers`, and with [`Error::AlreadyInitialized`] if
    /// the chain has a genesis already.
    pub fn sync_genesis<S>(
        &self,
        store: &mut HeaderStore<S>,
        witness: &dyn OperatorWitness,
        tx_signers: &[Address],
        bundle: &GenesisBundle,
    ) -> Result<Genesis, Error>
    where
        S: KeyValueMutate<Column = Column>,
    {
        let chain = self.chain;
        let operator = witness
            .authorize(tx_signers)
            .map_err(Error::OperatorAuthError)?;
        if store.find_genesis(chain)?.is_some() {
            return Err(Error::AlreadyInitialized(chain))
        }

        let genesis = self.verifier.validate_genesis(bundle)?;
        let number = genesis.number();
        let stored = StoredHeader {
            header: genesis.header.clone(),
            hash: genesis.hash,
            weight: genesis.header.difficulty,
            epoch_parent_hash: None,
            signer: self.verifier.genesis_signer(&genesis.header),
        };

        store.put_genesis(chain, &genesis)?;
        store.put(chain, &genesis.hash, &stored)?;
        store.put_canonical(chain, number, &genesis.hash)?;
        store.put_height(chain, number)?;

        tracing::info!(
            "Side chain {chain} initialized by {operator:?} at {number} {:?} with {} epochs",
            genesis.hash,
            genesis.epochs.len()
        );
        Ok(genesis)
    }
}

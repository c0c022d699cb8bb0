//! Verification of chains that rotate fixed validator epochs announced at
//! checkpoints, with the recently-signed spam guard.

use crate::{
    block_verifier::{
        epoch_parent_hash,
        recover_signer,
        seal_hash,
        verify_cascading_fields,
        verify_constant_fields,
        verify_difficulty_sentinel,
        verify_extra_layout,
        verify_timestamp,
        verify_turn_difficulty,
        ConsensusVerifier,
        Verified,
    },
    epoch::{
        EpochResolver,
        EpochWindow,
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
    RotationAnchor,
    RotationParams,
    SideChainConfig,
};
use header_sync_types::{
    blockchain::{
        epoch::ValidatorEpoch,
        genesis::{
            Genesis,
            GenesisBundle,
        },
        header::ForeignHeader,
        stored::StoredHeader,
    },
    Address,
    H256,
};
use std::sync::Arc;


pub struct FixedRotation {
    config: SideChainConfig,
    params: RotationParams,
    resolver: EpochResolver,
    recovery: Arc<dyn SignerRecovery>,
}

impl FixedRotation {
    pub fn new(
        config: SideChainConfig,
        params: RotationParams,
        recovery: Arc<dyn SignerRecovery>,
    ) -> Self {
        let resolver = EpochResolver::new(config.epoch_length, params.trailing_epochs);
        Self {
            config,
            params,
            resolver,
            recovery,
        }
    }

    /// The epochs preceding a child of the `parent`, newest first.
    pub fn epochs(
        &self,
        chain: &dyn HeaderReader,
        parent: &StoredHeader,
    ) -> Result<EpochWindow, Error> {
        self.resolver.resolve(chain, parent)
    }

    /// The rotation slot whose signer is in turn at `number`.
    pub fn in_turn_index(&self, number: u64, window: &EpochWindow, validators: usize) -> usize {
        let anchor = match self.params.anchor {
            RotationAnchor::EpochStart => {
                window.latest().map(|epoch| epoch.start_height).unwrap_or_default()
            }
            RotationAnchor::Zero => 0,
        };
        let n = validators.max(1) as u64;
        let offset = number.saturating_sub(anchor) % n;
        let guard = self.params.guard_offset % n;
        ((offset + n - guard) % n) as usize
    }

    fn seal_hash(&self, header: &ForeignHeader) -> H256 {
        seal_hash(header, self.params.seal_hash, self.config.internal_chain_id)
    }

    /// Rejects the `signer` if it sealed one of the last `⌊n/2⌋` headers above genesis.
    fn verify_recently_signed(
        &self,
        chain: &dyn HeaderReader,
        parent: &StoredHeader,
        signer: &Address,
        governing: &ValidatorEpoch,
        genesis_number: u64,
    ) -> Result<(), Error> {
        let mut cursor = parent.clone();
        for _ in 0..governing.half() {
            if cursor.number() <= genesis_number {
                break
            }
            if cursor.signer.as_ref() == Some(signer) {
                return Err(VerifyError::RecentlySigned(*signer).into())
            }
            cursor = chain.header(cursor.parent_hash())?.ok_or_else(|| {
                Error::epoch_resolution(format!(
                    "the ancestor {:?} is not stored",
                    cursor.parent_hash()
                ))
            })?;
        }
        Ok(())
    }
}

impl ConsensusVerifier for FixedRotation {
    fn verify(
        &self,
        chain: &dyn HeaderReader,
        header: &ForeignHeader,
        parent: &StoredHeader,
        now: u64,
    ) -> Result<Verified, Error> {
        let checkpoint = header.is_checkpoint(self.config.epoch_length);
        verify_timestamp(header, now, self.config.allowed_future_drift)?;
        verify_extra_layout(header, checkpoint)?;
        verify_constant_fields(header)?;
        verify_difficulty_sentinel(header)?;

        let window = self.epochs(chain, parent)?;
        let governing = window
            .governing(header.number)
            .ok_or_else(|| Error::epoch_resolution("no epoch governs the header"))?;

        let signer = recover_signer(self.recovery.as_ref(), header, &self.seal_hash(header))?;
        let position = governing
            .position(&signer)
            .ok_or(VerifyError::UnauthorizedSigner(signer))?;

        let in_turn_index = self.in_turn_index(header.number, &window, governing.len());
        verify_turn_difficulty(header, position == in_turn_index)?;

        let genesis_number = genesis_number(chain)?;
        self.verify_recently_signed(chain, parent, &signer, governing, genesis_number)?;

        verify_cascading_fields(&self.config, header, &parent.header)?;

        Ok(Verified {
            signer,
            epoch_parent_hash: epoch_parent_hash(parent, self.config.epoch_length),
        })
    }

    fn validate_genesis(&self, bundle: &GenesisBundle) -> Result<Genesis, Error> {
        let header = &bundle.header;
        if !header.is_checkpoint(self.config.epoch_length) {
            return Err(Error::epoch_resolution(format!(
                "the genesis {} is not a checkpoint",
                header.number
            )))
        }
        verify_extra_layout(header, true)?;
        let hash = header.hash();
        let own = ValidatorEpoch::from_checkpoint(header, hash)
            .ok_or(VerifyError::InvalidSignerList)?;

        if bundle.epochs.len() != self.params.trailing_epochs as usize {
            return Err(Error::epoch_resolution(format!(
                "the genesis needs {} trailing epochs, got {}",
                self.params.trailing_epochs,
                bundle.epochs.len()
            )))
        }
        let mut newer = own.start_height;
        for epoch in &bundle.epochs {
            if epoch.is_empty() {
                return Err(VerifyError::InvalidSignerList.into())
            }
            if epoch.start_height >= newer {
                return Err(Error::epoch_resolution(
                    "the trailing epochs must be ordered newest first",
                ))
            }
            newer = epoch.start_height;
        }

        let mut epochs = Vec::with_capacity(bundle.epochs.len() + 1);
        epochs.push(own);
        epochs.extend(bundle.epochs.iter().cloned());
        Ok(Genesis {
            header: header.clone(),
            hash,
            epochs,
        })
    }

    fn genesis_signer(&self, header: &ForeignHeader) -> Option<Address> {
        recover_signer(self.recovery.as_ref(), header, &self.seal_hash(header)).ok()
    }
}

fn genesis_number(chain: &dyn HeaderReader) -> Result<u64, Error> {
    chain
        .genesis()?
        .map(|genesis| genesis.number())
        .ok_or_else(|| Error::epoch_resolution("the side chain has no genesis"))
}

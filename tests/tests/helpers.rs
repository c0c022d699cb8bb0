use header_sync_chain_config::{
    ChainConfigs,
    ConsensusFlavor,
    RotationParams,
    SealHashScheme,
    SideChainConfig,
    LOCAL_ROTATION_CHAIN,
    LOCAL_VOTING_CHAIN,
};
use header_sync_consensus::test_helpers::{
    addresses,
    child_of,
    seal,
    test_keys,
    TestKey,
};
use header_sync_importer::{
    ports::StaticOperator,
    Config,
    HeaderSyncEngine,
};
use header_sync_storage::in_memory::MemoryStore;
use header_sync_types::{
    blockchain::{
        epoch::ValidatorEpoch,
        genesis::GenesisBundle,
        header::ForeignHeader,
    },
    test_helpers::unsealed_header,
    Address,
    H256,
};

pub type Engine = HeaderSyncEngine<MemoryStore, ChainConfigs, StaticOperator>;

pub fn operator() -> Address {
    Address::repeat_byte(0xee)
}

/// The rotation chain uses two trailing epochs and the guard offset of one.
pub fn configs() -> ChainConfigs {
    let mut rotation = SideChainConfig::fixed_rotation_testnet();
    rotation.consensus = ConsensusFlavor::FixedRotation(RotationParams {
        trailing_epochs: 2,
        guard_offset: 1,
        ..Default::default()
    });
    ChainConfigs::new()
        .with_chain(LOCAL_ROTATION_CHAIN, rotation)
        .with_chain(LOCAL_VOTING_CHAIN, SideChainConfig::voting_testnet())
}

pub fn engine_on(store: MemoryStore) -> Engine {
    HeaderSyncEngine::new(
        Config::default(),
        store,
        configs(),
        StaticOperator(operator()),
    )
}

pub fn engine() -> Engine {
    engine_on(MemoryStore::default())
}

/// Three validators rotating with the epoch length 200, bootstrapped at the
/// checkpoint 400.
pub struct RotationChain {
    pub keys: Vec<TestKey>,
    pub chain_id: u64,
    pub block_period: u64,
}

impl RotationChain {
    pub const GENESIS: u64 = 400;

    pub fn new() -> Self {
        let config = SideChainConfig::fixed_rotation_testnet();
        Self {
            keys: test_keys(3),
            chain_id: config.internal_chain_id,
            block_period: config.block_period,
        }
    }

    pub fn seal(&self, header: ForeignHeader, key: &TestKey) -> ForeignHeader {
        seal(header, key, SealHashScheme::ChainIdPrefixed, self.chain_id)
    }

    pub fn bundle(&self) -> GenesisBundle {
        let validators = addresses(&self.keys);
        let header = self.seal(
            unsealed_header(Self::GENESIS, H256::repeat_byte(9), &validators),
            &self.keys[0],
        );
        GenesisBundle {
            header,
            epochs: vec![
                ValidatorEpoch {
                    start_height: 200,
                    validators: validators.clone(),
                    hash: H256::repeat_byte(2),
                },
                ValidatorEpoch {
                    start_height: 0,
                    validators,
                    hash: H256::repeat_byte(1),
                },
            ],
        }
    }

    /// The validator in turn at `number` for the first epoch after genesis.
    pub fn in_turn_key(&self, number: u64) -> &TestKey {
        let index = (number - Self::GENESIS - 1) % self.keys.len() as u64;
        &self.keys[index as usize]
    }

    pub fn child(&self, parent: &ForeignHeader, key: &TestKey, in_turn: bool) -> ForeignHeader {
        self.seal(child_of(parent, self.block_period, in_turn, &[]), key)
    }

    /// `count` in-turn headers on top of the `parent`.
    pub fn extend(&self, parent: &ForeignHeader, count: usize) -> Vec<ForeignHeader> {
        let mut parent = parent.clone();
        (0..count)
            .map(|_| {
                let key = self.in_turn_key(parent.number + 1);
                let header = self.child(&parent, key, true);
                parent = header.clone();
                header
            })
            .collect()
    }
}

/// Three signers of a voting chain, bootstrapped at height zero.
pub struct VotingChain {
    pub keys: Vec<TestKey>,
    pub block_period: u64,
}

impl VotingChain {
    pub fn new() -> Self {
        Self {
            keys: test_keys(3),
            block_period: SideChainConfig::voting_testnet().block_period,
        }
    }

    pub fn bundle(&self) -> GenesisBundle {
        GenesisBundle {
            header: unsealed_header(0, H256::zero(), &addresses(&self.keys)),
            epochs: vec![],
        }
    }

    /// A child of the `parent` sealed by the `key`, with the difficulty of the
    /// turn of the key within `signers` sorted signers.
    pub fn child(&self, parent: &ForeignHeader, key: &TestKey, signers: &[Address]) -> ForeignHeader {
        let number = parent.number + 1;
        let in_turn = signers[(number % signers.len() as u64) as usize] == key.address();
        seal(
            child_of(parent, self.block_period, in_turn, &[]),
            key,
            SealHashScheme::Plain,
            0,
        )
    }

    /// Chains headers sealed by the keys at the `indexes`, starting at the `parent`.
    pub fn sealed_by(&self, parent: &ForeignHeader, indexes: &[usize]) -> Vec<ForeignHeader> {
        let signers = addresses(&self.keys);
        let mut parent = parent.clone();
        indexes
            .iter()
            .map(|index| {
                let header = self.child(&parent, &self.keys[*index], &signers);
                parent = header.clone();
                header
            })
            .collect()
    }
}

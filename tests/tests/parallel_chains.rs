use crate::helpers::{
    engine_on,
    operator,
    RotationChain,
    VotingChain,
};
use header_sync_chain_config::{
    LOCAL_ROTATION_CHAIN,
    LOCAL_VOTING_CHAIN,
};
use header_sync_storage::in_memory::MemoryStore;

#[test]
fn side_chains_sync_independently_on_one_store() {
    let store = MemoryStore::default();
    let rotation = RotationChain::new();
    let voting = VotingChain::new();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let mut engine = engine_on(store.clone());
            let genesis = engine
                .sync_genesis_header(LOCAL_ROTATION_CHAIN, &rotation.bundle(), &[operator()])
                .unwrap();
            for batch in rotation.extend(&genesis.header, 30).chunks(5) {
                engine
                    .sync_block_headers(LOCAL_ROTATION_CHAIN, batch.to_vec())
                    .unwrap();
            }
        });
        scope.spawn(|| {
            let mut engine = engine_on(store.clone());
            let genesis = engine
                .sync_genesis_header(LOCAL_VOTING_CHAIN, &voting.bundle(), &[operator()])
                .unwrap();
            let indexes: Vec<_> = (1..=30).map(|number| number % 3).collect();
            for batch in voting.sealed_by(&genesis.header, &indexes).chunks(7) {
                engine
                    .sync_block_headers(LOCAL_VOTING_CHAIN, batch.to_vec())
                    .unwrap();
            }
        });
    });

    let reader = engine_on(store);
    assert_eq!(
        reader.get_canonical_height(LOCAL_ROTATION_CHAIN).unwrap(),
        RotationChain::GENESIS + 30
    );
    assert_eq!(reader.get_canonical_height(LOCAL_VOTING_CHAIN).unwrap(), 30);
    let rotation_genesis = reader.get_genesis(LOCAL_ROTATION_CHAIN).unwrap();
    let voting_genesis = reader.get_genesis(LOCAL_VOTING_CHAIN).unwrap();
    assert!(!reader
        .is_header_known(LOCAL_VOTING_CHAIN, &rotation_genesis.hash)
        .unwrap());
    assert!(!reader
        .is_header_known(LOCAL_ROTATION_CHAIN, &voting_genesis.hash)
        .unwrap());
}

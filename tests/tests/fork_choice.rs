use crate::helpers::{
    engine,
    operator,
    Engine,
    VotingChain,
};
use header_sync_chain_config::LOCAL_VOTING_CHAIN as CHAIN;
use header_sync_types::blockchain::{
    genesis::Genesis,
    header::ForeignHeader,
};
use test_case::test_case;

fn bootstrapped() -> (Engine, VotingChain, Genesis) {
    let mut engine = engine();
    let chain = VotingChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();
    (engine, chain, genesis)
}

fn canonical(engine: &Engine) -> Vec<u64> {
    let height = engine.get_canonical_height(CHAIN).unwrap();
    (0..=height)
        .map(|height| engine.get_header_by_height(CHAIN, height).unwrap().number())
        .collect()
}

fn hashes(headers: &[ForeignHeader]) -> Vec<header_sync_types::BlockHash> {
    headers.iter().map(ForeignHeader::hash).collect()
}

#[test]
fn canonical_height_grows_with_every_header() {
    let (mut engine, chain, genesis) = bootstrapped();
    let mut parent = genesis.header.clone();

    for number in 1..=6u64 {
        let index = (number % 3) as usize;
        let header = chain.sealed_by(&parent, &[index]);
        engine.sync_block_headers(CHAIN, header.clone()).unwrap();
        assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), number);
        parent = header[0].clone();
    }
    assert_eq!(canonical(&engine), (0..=6).collect::<Vec<_>>());
}

#[test]
fn resubmission_changes_nothing() {
    let (mut engine, chain, genesis) = bootstrapped();
    let headers = chain.sealed_by(&genesis.header, &[1, 2, 0]);
    engine.sync_block_headers(CHAIN, headers.clone()).unwrap();

    let outcome = engine.sync_block_headers(CHAIN, headers.clone()).unwrap();

    assert_eq!(outcome.duplicates, 3);
    assert_eq!(outcome.admitted(), 0);
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 3);
    assert_eq!(
        engine.get_canonical_hash(CHAIN, 3).unwrap(),
        headers[2].hash()
    );
}

// The out-of-turn branch is longer: weights +1, +2, +3 at heights 1..=3.
// The in-turn branch is heavier: weights +2, +4 at heights 1..=2.
#[test_case(true; "longer branch first")]
#[test_case(false; "heavier branch first")]
fn heavier_branch_wins_regardless_of_order(longer_first: bool) {
    let (mut engine, chain, genesis) = bootstrapped();
    let longer = chain.sealed_by(&genesis.header, &[2, 0, 1]);
    let heavier = chain.sealed_by(&genesis.header, &[1, 2]);

    let (first, second) = if longer_first {
        (&longer, &heavier)
    } else {
        (&heavier, &longer)
    };
    engine.sync_block_headers(CHAIN, first.clone()).unwrap();
    let outcome = engine.sync_block_headers(CHAIN, second.clone()).unwrap();

    if longer_first {
        assert_eq!(outcome.reorg_depth, 3);
    } else {
        assert_eq!(outcome.non_canonical, 3);
        assert_eq!(outcome.head, None);
    }
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 2);
    for (height, hash) in (1..).zip(hashes(&heavier)) {
        assert_eq!(engine.get_canonical_hash(CHAIN, height).unwrap(), hash);
    }
    for hash in hashes(&longer) {
        assert!(engine.is_header_known(CHAIN, &hash).unwrap());
        assert!(!engine.is_canonical(CHAIN, &hash).unwrap());
    }
    assert!(engine.get_canonical_hash(CHAIN, 3).is_err());
}

#[test]
fn equal_weight_keeps_the_first_branch() {
    let (mut engine, chain, genesis) = bootstrapped();
    let incumbent = chain.sealed_by(&genesis.header, &[0]);
    let challenger = chain.sealed_by(&genesis.header, &[2]);

    engine.sync_block_headers(CHAIN, incumbent.clone()).unwrap();
    engine.sync_block_headers(CHAIN, challenger.clone()).unwrap();

    assert_eq!(
        engine.get_canonical_hash(CHAIN, 1).unwrap(),
        incumbent[0].hash()
    );
}

#[test]
fn reorg_depth_counts_the_replaced_heights() {
    let (mut engine, chain, genesis) = bootstrapped();
    let old = chain.sealed_by(&genesis.header, &[2, 0]);
    engine.sync_block_headers(CHAIN, old).unwrap();

    let tied = engine
        .sync_block_headers(CHAIN, chain.sealed_by(&genesis.header, &[1]))
        .unwrap();
    assert_eq!(tied.canonical, 0);
    assert_eq!(tied.non_canonical, 1);

    let new = chain.sealed_by(&genesis.header, &[1, 2]);
    let outcome = engine.sync_block_headers(CHAIN, new.clone()).unwrap();

    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.head, Some((2, new[1].hash())));
    assert_eq!(outcome.reorg_depth, 2);
    assert_eq!(canonical(&engine), vec![0, 1, 2]);
    assert_eq!(engine.confirmations(CHAIN, &new[0].hash()).unwrap(), Some(1));
}

use crate::helpers::{
    engine,
    operator,
    RotationChain,
};
use header_sync_chain_config::LOCAL_ROTATION_CHAIN as CHAIN;
use header_sync_consensus::VerifyError;
use header_sync_importer::Error;
use test_case::test_case;

#[test]
fn validators_take_turns_after_genesis() {
    let mut engine = engine();
    let chain = RotationChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();
    assert_eq!(genesis.epochs.len(), 3);

    let headers = chain.extend(&genesis.header, 6);
    let outcome = engine.sync_block_headers(CHAIN, headers.clone()).unwrap();

    assert_eq!(outcome.canonical, 6);
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 406);
    let first = engine.get_header_by_height(CHAIN, 401).unwrap();
    assert_eq!(first.signer, Some(chain.keys[0].address()));
    assert_eq!(first.epoch_parent_hash, Some(genesis.hash));
    assert_eq!(
        engine
            .get_header_by_height(CHAIN, 406)
            .unwrap()
            .epoch_parent_hash,
        Some(genesis.hash)
    );
}

#[test_case(0, false => VerifyError::RecentlySigned(RotationChain::new().keys[0].address()); "previous signer again")]
#[test_case(2, true => VerifyError::InvalidDifficulty; "claims a foreign turn")]
#[test_case(1, false => VerifyError::InvalidDifficulty; "in turn with the no-turn difficulty")]
fn second_header_rules(key: usize, in_turn: bool) -> VerifyError {
    let mut engine = engine();
    let chain = RotationChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();
    let first = chain.extend(&genesis.header, 1);
    engine.sync_block_headers(CHAIN, first.clone()).unwrap();

    let second = chain.child(&first[0], &chain.keys[key], in_turn);
    match engine.sync_block_headers(CHAIN, vec![second]) {
        Err(Error::Verification(err)) => err,
        other => panic!("expected a verification error, got {other:?}"),
    }
}

#[test]
fn rejected_header_keeps_the_earlier_batch() {
    let mut engine = engine();
    let chain = RotationChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();
    let good = chain.extend(&genesis.header, 2);
    engine.sync_block_headers(CHAIN, good.clone()).unwrap();

    let mut batch = chain.extend(&good[1], 2);
    batch[1] = chain.child(&batch[0], chain.in_turn_key(404), false);
    let result = engine.sync_block_headers(CHAIN, batch.clone());

    assert!(matches!(
        result,
        Err(Error::Verification(VerifyError::InvalidDifficulty))
    ));
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 402);
    assert!(!engine.is_header_known(CHAIN, &batch[0].hash()).unwrap());
}

#[test]
fn genesis_needs_every_trailing_epoch() {
    let mut engine = engine();
    let chain = RotationChain::new();
    let mut bundle = chain.bundle();
    bundle.epochs.pop();

    let result = engine.sync_genesis_header(CHAIN, &bundle, &[operator()]);

    assert!(matches!(result, Err(Error::EpochResolutionFailed(_))));
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 0);
}

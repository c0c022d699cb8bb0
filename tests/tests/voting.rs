use crate::helpers::{
    engine,
    operator,
    VotingChain,
};
use header_sync_chain_config::{
    SealHashScheme,
    LOCAL_VOTING_CHAIN as CHAIN,
};
use header_sync_consensus::{
    test_helpers::{
        addresses,
        child_of,
        seal,
        TestKey,
    },
    voting_snapshot::NONCE_AUTH,
    VerifyError,
};
use header_sync_importer::Error;
use header_sync_types::{
    blockchain::header::ForeignHeader,
    Address,
};

fn vote(
    chain: &VotingChain,
    parent: &ForeignHeader,
    key: &TestKey,
    candidate: Address,
) -> ForeignHeader {
    let signers = addresses(&chain.keys);
    let in_turn = signers[((parent.number + 1) % 3) as usize] == key.address();
    let mut header = child_of(parent, chain.block_period, in_turn, &[]);
    header.coinbase = candidate;
    header.nonce = NONCE_AUTH;
    seal(header, key, SealHashScheme::Plain, 0)
}

#[test]
fn candidate_signs_only_after_the_deciding_vote() {
    let mut engine = engine();
    let chain = VotingChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();
    let candidate = TestKey::from_seed(99);

    let first = vote(&chain, &genesis.header, &chain.keys[1], candidate.address());
    engine.sync_block_headers(CHAIN, vec![first.clone()]).unwrap();

    let early = seal(
        child_of(&first, chain.block_period, false, &[]),
        &candidate,
        SealHashScheme::Plain,
        0,
    );
    assert!(matches!(
        engine.sync_block_headers(CHAIN, vec![early]),
        Err(Error::Verification(VerifyError::UnauthorizedSigner(signer)))
            if signer == candidate.address()
    ));

    let second = vote(&chain, &first, &chain.keys[2], candidate.address());
    engine.sync_block_headers(CHAIN, vec![second.clone()]).unwrap();

    let mut signers = addresses(&chain.keys);
    signers.push(candidate.address());
    signers.sort();
    let in_turn = signers[3] == candidate.address();
    let by_candidate = seal(
        child_of(&second, chain.block_period, in_turn, &[]),
        &candidate,
        SealHashScheme::Plain,
        0,
    );
    engine
        .sync_block_headers(CHAIN, vec![by_candidate.clone()])
        .unwrap();

    let stored = engine.get_header_by_height(CHAIN, 3).unwrap();
    assert_eq!(stored.hash, by_candidate.hash());
    assert_eq!(stored.signer, Some(candidate.address()));
}

#[test]
fn signer_waits_for_the_others() {
    let mut engine = engine();
    let chain = VotingChain::new();
    let genesis = engine
        .sync_genesis_header(CHAIN, &chain.bundle(), &[operator()])
        .unwrap();

    let result = engine.sync_block_headers(CHAIN, chain.sealed_by(&genesis.header, &[1, 1]));

    assert!(matches!(
        result,
        Err(Error::Verification(VerifyError::RecentlySigned(signer)))
            if signer == chain.keys[1].address()
    ));
    assert_eq!(engine.get_canonical_height(CHAIN).unwrap(), 0);
}

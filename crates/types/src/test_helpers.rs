//! Helpers to build well-formed headers in tests.

use crate::blockchain::{
    header::{
        empty_uncle_hash,
        ForeignHeader,
        EXTRA_SEAL,
        EXTRA_VANITY,
    },
    primitives::{
        Address,
        BlockHash,
        U256,
    },
};

/// The gas limit used by the generated headers.
pub const TEST_GAS_LIMIT: u64 = 30_000_000;

/// The timestamp of the generated header at height zero.
pub const TEST_BASE_TIMESTAMP: u64 = 1_600_000_000;

/// Builds an unsealed header at `number` on top of `parent_hash`. The extra data has
/// an empty vanity, the given signer list, and a zeroed seal placeholder.
pub fn unsealed_header(
    number: u64,
    parent_hash: BlockHash,
    signers: &[Address],
) -> ForeignHeader {
    let mut extra_data = vec![0u8; EXTRA_VANITY];
    for signer in signers {
        extra_data.extend_from_slice(signer.as_bytes());
    }
    extra_data.extend_from_slice(&[0u8; EXTRA_SEAL]);

    ForeignHeader {
        parent_hash,
        uncle_hash: empty_uncle_hash(),
        difficulty: U256::from(2),
        number,
        gas_limit: TEST_GAS_LIMIT,
        gas_used: 0,
        timestamp: TEST_BASE_TIMESTAMP + number * 3,
        extra_data,
        ..Default::default()
    }
}

use ethers_core::types::Signature;
use header_sync_storage::Result as StorageResult;
use header_sync_types::{
    blockchain::{
        genesis::Genesis,
        stored::StoredHeader,
    },
    Address,
    BlockHash,
    H256,
};
use std::time::{
    SystemTime,
    UNIX_EPOCH,
};

#[cfg_attr(test, mockall::automock)]
/// Recovers the address that produced a 65 byte `r || s || v` seal over the `hash`.
pub trait SignerRecovery: Send + Sync {
    fn recover_signer(&self, hash: &H256, seal: &[u8]) -> anyhow::Result<Address>;
}

/// The secp256k1 recovery used by the Ethereum family of chains.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover_signer(&self, hash: &H256, seal: &[u8]) -> anyhow::Result<Address> {
        let signature = Signature::try_from(seal)?;
        Ok(signature.recover(*hash)?)
    }
}

#[cfg_attr(test, mockall::automock)]
/// The read access to the headers of one side chain.
pub trait HeaderReader {
    fn header(&self, hash: &BlockHash) -> StorageResult<Option<StoredHeader>>;

    fn genesis(&self) -> StorageResult<Option<Genesis>>;
}

/// The source of the local time, in seconds since the unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }
}

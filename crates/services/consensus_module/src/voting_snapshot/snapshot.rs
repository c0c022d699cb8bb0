use crate::error::{
    Error,
    VerifyError,
};
use header_sync_types::{
    blockchain::stored::StoredHeader,
    Address,
    BlockHash,
    H64,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
};

/// The nonce of a header voting to add its coinbase to the signers.
pub const NONCE_AUTH: H64 = H64([0xff; 8]);
/// The nonce of a header voting to remove its coinbase from the signers.
pub const NONCE_DROP: H64 = H64([0x00; 8]);

/// A single vote cast by an authorized signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub signer: Address,
    pub block: u64,
    pub address: Address,
    pub authorize: bool,
}

/// The running tally of the votes on one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
    pub authorize: bool,
    pub votes: usize,
}

/// The state of the signer voting after the header `hash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub number: u64,
    pub hash: BlockHash,
    pub signers: BTreeSet<Address>,
    /// The signers of the recent headers, by height.
    pub recents: BTreeMap<u64, Address>,
    /// The votes in the order they were cast.
    pub votes: Vec<Vote>,
    pub tally: BTreeMap<Address, Tally>,
}

impl Snapshot {
    pub fn new(number: u64, hash: BlockHash, signers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            number,
            hash,
            signers: signers.into_iter().collect(),
            recents: Default::default(),
            votes: Default::default(),
            tally: Default::default(),
        }
    }

    /// The signers in ascending order, which is the rotation order.
    pub fn signers_sorted(&self) -> Vec<Address> {
        self.signers.iter().copied().collect()
    }

    /// The number of recent heights a signer has to wait before sealing again.
    pub fn recents_limit(&self) -> u64 {
        (self.signers.len() / 2 + 1) as u64
    }

    /// Returns `true` if the `signer` is in turn at `number`.
    pub fn in_turn(&self, number: u64, signer: &Address) -> bool {
        let n = self.signers.len() as u64;
        if n == 0 {
            return false
        }
        self.signers.iter().nth((number % n) as usize) == Some(signer)
    }

    /// Returns `true` if the `signer` sealed one of the last `⌊n/2⌋` headers
    /// before `number`.
    pub fn recently_signed(&self, number: u64, signer: &Address) -> bool {
        let limit = self.recents_limit();
        self.recents
            .iter()
            .any(|(seen, recent)| recent == signer && seen.saturating_add(limit) > number)
    }

    /// Counts a vote if it would change the membership of the `address`.
    fn cast(&mut self, address: Address, authorize: bool) -> bool {
        if self.signers.contains(&address) == authorize {
            return false
        }
        self.tally
            .entry(address)
            .and_modify(|tally| tally.votes += 1)
            .or_insert(Tally {
                authorize,
                votes: 1,
            });
        true
    }

    /// Removes a previously counted vote.
    fn uncast(&mut self, address: &Address, authorize: bool) -> bool {
        let Some(tally) = self.tally.get_mut(address) else {
            return false
        };
        if tally.authorize != authorize {
            return false
        }
        if tally.votes > 1 {
            tally.votes -= 1;
        } else {
            self.tally.remove(address);
        }
        true
    }

    fn forget_recent(&mut self, number: u64) {
        let limit = self.recents_limit();
        if number >= limit {
            self.recents.remove(&(number - limit));
        }
    }

    /// Replays the `headers`, which must directly follow the snapshot in
    /// ascending order, and returns the resulting snapshot.
    pub fn apply(&self, headers: &[StoredHeader], epoch_length: u64) -> Result<Self, Error> {
        let mut snap = self.clone();
        for stored in headers {
            let header = &stored.header;
            let number = header.number;
            if number != snap.number + 1 || header.parent_hash != snap.hash {
                return Err(Error::epoch_resolution(format!(
                    "the header {number} doesn't follow the snapshot {}",
                    snap.number
                )))
            }
            if header.is_checkpoint(epoch_length) {
                snap.votes.clear();
                snap.tally.clear();
            }
            snap.forget_recent(number);

            let signer = stored.signer.ok_or_else(|| {
                Error::epoch_resolution(format!("the header {number} has no signer"))
            })?;
            if !snap.signers.contains(&signer) {
                return Err(VerifyError::UnauthorizedSigner(signer).into())
            }
            if snap.recents.values().any(|recent| *recent == signer) {
                return Err(VerifyError::RecentlySigned(signer).into())
            }
            snap.recents.insert(number, signer);

            let coinbase = header.coinbase;
            if let Some(index) = snap
                .votes
                .iter()
                .position(|vote| vote.signer == signer && vote.address == coinbase)
            {
                let previous = snap.votes.remove(index);
                snap.uncast(&previous.address, previous.authorize);
            }

            let authorize = if header.nonce == NONCE_AUTH {
                true
            } else if header.nonce == NONCE_DROP {
                false
            } else {
                return Err(VerifyError::InvalidVote.into())
            };
            if snap.cast(coinbase, authorize) {
                snap.votes.push(Vote {
                    signer,
                    block: number,
                    address: coinbase,
                    authorize,
                });
            }

            let decided = snap
                .tally
                .get(&coinbase)
                .filter(|tally| tally.votes > snap.signers.len() / 2)
                .copied();
            if let Some(tally) = decided {
                if tally.authorize {
                    snap.signers.insert(coinbase);
                } else {
                    snap.signers.remove(&coinbase);
                    snap.forget_recent(number);
                    let revoked: Vec<_> = snap
                        .votes
                        .iter()
                        .filter(|vote| vote.signer == coinbase)
                        .cloned()
                        .collect();
                    for vote in revoked {
                        snap.uncast(&vote.address, vote.authorize);
                    }
                    snap.votes.retain(|vote| vote.signer != coinbase);
                }
                snap.votes.retain(|vote| vote.address != coinbase);
                snap.tally.remove(&coinbase);
                tracing::debug!(
                    "{coinbase:?} {} at {number}",
                    if tally.authorize { "joined the signers" } else { "left the signers" }
                );
            }

            snap.number = number;
            snap.hash = stored.hash;
        }
        Ok(snap)
    }
}

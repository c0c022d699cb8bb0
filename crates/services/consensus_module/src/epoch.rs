//! Resolution of the validator epochs that govern a header of a rotation chain.

use crate::{
    error::Error,
    ports::HeaderReader,
};
use header_sync_types::blockchain::{
    epoch::ValidatorEpoch,
    genesis::Genesis,
    stored::StoredHeader,
};

/// The largest number of epochs a window can hold: the current epoch and two
/// trailing ones.
pub const MAX_EPOCH_WINDOW: usize = 3;

/// The validator epochs preceding a header, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochWindow {
    epochs: [Option<ValidatorEpoch>; MAX_EPOCH_WINDOW],
    len: usize,
}

impl EpochWindow {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `index`-th epoch, `0` being the newest.
    pub fn get(&self, index: usize) -> Option<&ValidatorEpoch> {
        self.epochs.get(index)?.as_ref()
    }

    /// The newest epoch, announced by the latest checkpoint before the header.
    pub fn latest(&self) -> Option<&ValidatorEpoch> {
        self.get(0)
    }

    fn push(&mut self, epoch: ValidatorEpoch) {
        if let Some(slot) = self.epochs.get_mut(self.len) {
            *slot = Some(epoch);
            self.len += 1;
        }
    }

    /// Returns the epoch whose validators may seal the header at `number`.
    ///
    /// A set announced at the checkpoint `C` takes over for headers above
    /// `C + ⌊|previous set| / 2⌋`. Until then the previous set governs, and the
    /// oldest epoch of the window is assumed to be active.
    pub fn governing(&self, number: u64) -> Option<&ValidatorEpoch> {
        for index in 0..self.len {
            let epoch = self.get(index)?;
            match self.get(index + 1) {
                Some(previous) => {
                    if number > epoch.start_height.saturating_add(previous.half()) {
                        return Some(epoch)
                    }
                }
                None => return Some(epoch),
            }
        }
        None
    }
}

/// Walks the checkpoint ancestry of a header to build its [`EpochWindow`].
#[derive(Clone, Copy, Debug)]
pub struct EpochResolver {
    epoch_length: u64,
    capacity: usize,
}

impl EpochResolver {
    /// `trailing_epochs` is how many epochs before the current one may still
    /// govern a header.
    pub fn new(epoch_length: u64, trailing_epochs: u8) -> Self {
        let capacity = (trailing_epochs as usize)
            .saturating_add(1)
            .min(MAX_EPOCH_WINDOW);
        Self {
            epoch_length,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolves the epochs preceding a child of the `parent`.
    pub fn resolve(
        &self,
        chain: &dyn HeaderReader,
        parent: &StoredHeader,
    ) -> Result<EpochWindow, Error> {
        let genesis = chain
            .genesis()?
            .ok_or_else(|| Error::epoch_resolution("the side chain has no genesis"))?;
        if parent.number() < genesis.number() {
            return Err(Error::epoch_resolution(format!(
                "the header {} is below the genesis {}",
                parent.number(),
                genesis.number()
            )))
        }

        let mut window = EpochWindow::default();
        let mut cursor = parent.clone();
        while window.len() < self.capacity {
            if cursor.hash == genesis.hash {
                self.fill_from_genesis(&mut window, &genesis);
                break
            }
            if cursor.number() <= genesis.number() {
                return Err(Error::epoch_resolution(format!(
                    "the ancestry of {} doesn't lead to the genesis",
                    parent.hash
                )))
            }
            if cursor.header.is_checkpoint(self.epoch_length) {
                let epoch = ValidatorEpoch::from_checkpoint(&cursor.header, cursor.hash)
                    .ok_or_else(|| {
                        Error::epoch_resolution(format!(
                            "the checkpoint {} has no signer list",
                            cursor.number()
                        ))
                    })?;
                window.push(epoch);
            }
            cursor = self.previous_checkpoint(chain, &cursor, &genesis)?;
        }
        Ok(window)
    }

    fn fill_from_genesis(&self, window: &mut EpochWindow, genesis: &Genesis) {
        for epoch in &genesis.epochs {
            if window.len() >= self.capacity {
                break
            }
            window.push(epoch.clone());
        }
    }

    /// Follows the `epoch_parent_hash` shortcut, or walks the parents when the
    /// shortcut is missing.
    fn previous_checkpoint(
        &self,
        chain: &dyn HeaderReader,
        cursor: &StoredHeader,
        genesis: &Genesis,
    ) -> Result<StoredHeader, Error> {
        if let Some(hash) = cursor.epoch_parent_hash {
            return self.fetch(chain, &hash)
        }

        let mut walked = self.fetch(chain, cursor.parent_hash())?;
        for _ in 0..self.epoch_length {
            if walked.hash == genesis.hash || walked.header.is_checkpoint(self.epoch_length)
            {
                return Ok(walked)
            }
            walked = self.fetch(chain, walked.parent_hash())?;
        }
        Err(Error::epoch_resolution(format!(
            "no checkpoint within {} headers below {}",
            self.epoch_length,
            cursor.number()
        )))
    }

    fn fetch(
        &self,
        chain: &dyn HeaderReader,
        hash: &header_sync_types::BlockHash,
    ) -> Result<StoredHeader, Error> {
        chain.header(hash)?.ok_or_else(|| {
            Error::epoch_resolution(format!("the ancestor {hash:?} is not stored"))
        })
    }
}

mod chain;
mod consensus;
mod error;
mod header_sync;

pub use chain::*;
pub use consensus::*;
pub use error::*;
pub use header_sync::*;

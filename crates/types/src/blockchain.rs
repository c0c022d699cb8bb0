//! The module contains the side-chain types: headers as they arrive from relayers,
//! headers as they are persisted, validator epochs, and the genesis record.

pub mod epoch;
pub mod genesis;
pub mod header;
pub mod primitives;
pub mod stored;

//! The admission side of the header sync engine: relayer batches are verified
//! by the consensus of their side chain, weighted, and folded into the canonical
//! chain of that side chain. [`engine::HeaderSyncEngine`] is the entry point.

#![deny(unused_must_use)]

pub mod chain_view;
pub mod config;
pub mod engine;
pub mod error;
pub mod genesis;
pub mod pipeline;
pub mod ports;
pub mod query;

pub use config::Config;
pub use engine::HeaderSyncEngine;
pub use error::Error;
pub use pipeline::{
    Admission,
    AdmissionPipeline,
    BatchOutcome,
};

#[cfg(test)]
header_sync_trace::enable_tracing!();

//! Types exchanged with the outer dispatch layer.

pub mod header_sync;

#![deny(unused_must_use)]

mod fixed_rotation;
mod fork_choice;
mod helpers;
mod parallel_chains;
mod voting;

header_sync_trace::enable_tracing!();

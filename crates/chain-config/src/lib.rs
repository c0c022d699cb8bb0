#![deny(unused_must_use)]

pub mod config;

pub use config::*;

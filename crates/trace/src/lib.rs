//! Installs a global `tracing` subscriber for tests, driven by environment
//! variables:
//!
//! - `HEADER_SYNC_TRACE`: `1`/`true`/`on`, `compact`, `pretty`, `log-file` or `log-show`.
//! - `HEADER_SYNC_TRACE_PATH`: the directory of the rolling log file.
//! - `RUST_LOG`: the usual `EnvFilter` directives.
//!
//! Test modules pull the initializer in with [`enable_tracing!`].

use ctor::ctor;
use std::{
    env::var,
    str::FromStr,
};
use tracing_subscriber::{
    fmt::format,
    prelude::*,
    EnvFilter,
};

pub const TRACE_ENV: &str = "HEADER_SYNC_TRACE";
pub const TRACE_PATH_ENV: &str = "HEADER_SYNC_TRACE_PATH";

/// The output selected by [`TRACE_ENV`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceMode {
    Full,
    Compact,
    Pretty,
    /// Only into the rolling log file.
    LogFile,
    /// Into the rolling log file and to stderr.
    LogShow,
}

impl FromStr for TraceMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "true" | "on" => Ok(TraceMode::Full),
            "compact" => Ok(TraceMode::Compact),
            "pretty" => Ok(TraceMode::Pretty),
            "log-file" => Ok(TraceMode::LogFile),
            "log-show" => Ok(TraceMode::LogShow),
            _ => Err(()),
        }
    }
}

fn log_file() -> tracing_appender::rolling::RollingFileAppender {
    let log_path = var(TRACE_PATH_ENV)
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/logs").to_string());
    tracing_appender::rolling::daily(log_path, "header-sync.log")
}

/// Installs the subscriber for the `mode`. Does nothing if one is already installed.
pub fn init(mode: TraceMode) {
    let builder =
        tracing_subscriber::FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env());
    let _ = match mode {
        TraceMode::Full => builder.try_init(),
        TraceMode::Compact => builder.event_format(format().compact()).try_init(),
        TraceMode::Pretty => builder.event_format(format().pretty()).try_init(),
        TraceMode::LogFile => builder
            .event_format(format().compact())
            .with_ansi(false)
            .with_writer(log_file())
            .try_init(),
        TraceMode::LogShow => {
            let file = tracing_subscriber::fmt::Layer::new()
                .compact()
                .with_ansi(false)
                .with_writer(log_file());
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr))
                .with(file)
                .try_init()
                .map_err(Into::into)
        }
    };
}

#[ctor]
pub static TRACE: () = {
    if let Some(mode) = var(TRACE_ENV).ok().and_then(|v| v.parse().ok()) {
        init(mode);
    }
};

#[macro_export]
macro_rules! enable_tracing {
    () => {
        static _TRACE: &$crate::TRACE<()> = &$crate::TRACE;
    };
}

//! Diagnostic logging to stderr.
//!
//! stdout carries the plugin line, so every log record goes to stderr.
//! `RUST_LOG` overrides the level picked from the verbosity flag.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Level for a repeated `-v` flag. A single `-v` only adds detail lines
    /// to the plugin output, so logging starts at `-vv`.
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 | 1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

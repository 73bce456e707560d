//! Parser for `systemd-analyze` boot time output.

use super::atoms::{ParseError, ParseErrorReason};
use super::duration::parse_timespan;
use serde::{Deserialize, Serialize};

const SOURCE_ID: &str = "systemd-analyze";

/// Boot completion as reported by `systemd-analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartupStatus {
    /// Startup finished after this many seconds
    Finished { seconds: f64 },
    /// The manager has not reached its default target yet
    NotFinished,
}

impl StartupStatus {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            StartupStatus::Finished { seconds } => Some(*seconds),
            StartupStatus::NotFinished => None,
        }
    }
}

/// Parse the startup time from `systemd-analyze` output.
///
/// The `reached after X in userspace` line is preferred. Older systemd
/// releases only print the `Startup finished ... = X` summary, in which case
/// the total after `=` is used.
pub fn parse_startup(output: &str) -> Result<StartupStatus, ParseError> {
    if output.contains("Bootup is not yet finished") {
        return Ok(StartupStatus::NotFinished);
    }

    let mut total = None;
    for line in output.lines() {
        if let Some(rest) = line.split("reached after ").nth(1) {
            let span = rest.split(" in userspace").next().unwrap_or(rest);
            return Ok(StartupStatus::Finished {
                seconds: parse_timespan(span),
            });
        }

        if line.contains("Startup finished") {
            if let Some((_, after)) = line.rsplit_once(" = ") {
                total = Some(parse_timespan(after));
            }
        }
    }

    match total {
        Some(seconds) => Ok(StartupStatus::Finished { seconds }),
        None => Err(ParseError::new(
            SOURCE_ID,
            ParseErrorReason::MissingSection("Startup finished".to_string()),
            output.lines().next().unwrap_or(""),
        )),
    }
}

//! Check options: which scopes to evaluate and their thresholds.
//!
//! Loaded from TOML by `unitcheck_common::config` and overridden by command
//! line flags. Every field has a default, so an empty file is valid.

use crate::severity::Thresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How unit states are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Parse `systemctl list-units` tables
    Cli,
    /// Query `systemctl show` property blocks
    Properties,
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Cli
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Cli => f.write_str("cli"),
            DataSource::Properties => f.write_str("properties"),
        }
    }
}

/// Unit selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitOptions {
    /// Check only this unit
    #[serde(default)]
    pub unit: Option<String>,

    /// Include patterns (prefix-anchored regular expressions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude patterns; also applied to timers
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Unit types to include, e.g. `service`
    #[serde(default)]
    pub include_type: Vec<String>,

    /// Unit types to exclude
    #[serde(default)]
    pub exclude_type: Vec<String>,

    /// Treat `inactive` as OK for a single unit
    #[serde(default)]
    pub ignore_inactive_state: bool,
}

/// Startup time scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds
    #[serde(default = "default_startup_warning")]
    pub warning: Option<f64>,

    /// Seconds
    #[serde(default = "default_startup_critical")]
    pub critical: Option<f64>,
}

fn default_true() -> bool {
    true
}

fn default_startup_warning() -> Option<f64> {
    Some(60.0)
}

fn default_startup_critical() -> Option<f64> {
    Some(120.0)
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: default_startup_warning(),
            critical: default_startup_critical(),
        }
    }
}

impl StartupOptions {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning, self.critical)
    }
}

/// Dead timer scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerOptions {
    #[serde(default)]
    pub enabled: bool,

    /// Seconds since last run (6 days)
    #[serde(default = "default_timers_warning")]
    pub warning: Option<f64>,

    /// Seconds since last run (7 days)
    #[serde(default = "default_timers_critical")]
    pub critical: Option<f64>,
}

fn default_timers_warning() -> Option<f64> {
    Some(6.0 * 86_400.0)
}

fn default_timers_critical() -> Option<f64> {
    Some(7.0 * 86_400.0)
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            warning: default_timers_warning(),
            critical: default_timers_critical(),
        }
    }
}

impl TimerOptions {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning, self.critical)
    }
}

/// How commands are run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionOptions {
    #[serde(default)]
    pub source: DataSource,

    /// Query the user manager instead of the system manager
    #[serde(default)]
    pub user: bool,

    /// Per-command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for AcquisitionOptions {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            user: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// All options of one check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOptions {
    #[serde(default)]
    pub units: UnitOptions,

    #[serde(default)]
    pub startup: StartupOptions,

    #[serde(default)]
    pub timers: TimerOptions,

    #[serde(default)]
    pub acquisition: AcquisitionOptions,

    /// Append performance data to the status line
    #[serde(default = "default_true")]
    pub performance_data: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            units: UnitOptions::default(),
            startup: StartupOptions::default(),
            timers: TimerOptions::default(),
            acquisition: AcquisitionOptions::default(),
            performance_data: true,
        }
    }
}

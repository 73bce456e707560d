//! CLI - Command-line argument parsing
//!
//! Defines the `check_systemd` arguments with clap and folds them over the
//! options loaded from the configuration file. Execution lives in `runtime`.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use unitcheck_shared::{CheckOptions, DataSource};

/// Monitoring plugin for systemd
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "check_systemd")]
#[command(
    about = "Monitoring plugin that checks systemd units, startup time and timers",
    long_about = None
)]
#[command(version = crate::VERSION)]
pub struct Cli {
    /// Check only this unit
    #[arg(
        short = 'u',
        long,
        value_name = "UNIT",
        conflicts_with_all = ["include", "exclude", "include_type", "exclude_type"]
    )]
    pub unit: Option<String>,

    /// Include units matching this regular expression (repeatable)
    #[arg(short = 'i', long, value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Exclude units matching this regular expression (repeatable)
    #[arg(short = 'e', long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Include only units of these types, e.g. service timer
    #[arg(long, value_name = "TYPE", num_args = 1..)]
    pub include_type: Vec<String>,

    /// Exclude units of these types
    #[arg(long, value_name = "TYPE", num_args = 1..)]
    pub exclude_type: Vec<String>,

    /// Do not report an inactive unit given with --unit
    #[arg(long)]
    pub ignore_inactive_state: bool,

    /// Startup time warning threshold in seconds
    #[arg(short = 'w', long, value_name = "SECONDS")]
    pub warning: Option<f64>,

    /// Startup time critical threshold in seconds
    #[arg(short = 'c', long, value_name = "SECONDS")]
    pub critical: Option<f64>,

    /// Skip the startup time check
    #[arg(short = 'n', long)]
    pub no_startup_time: bool,

    /// Detect timers that no longer run
    #[arg(short = 't', long, visible_alias = "dead-timers")]
    pub timers: bool,

    /// Seconds since a timer last ran before WARNING
    #[arg(short = 'W', long, value_name = "SECONDS")]
    pub timers_warning: Option<f64>,

    /// Seconds since a timer last ran before CRITICAL
    #[arg(short = 'C', long, value_name = "SECONDS")]
    pub timers_critical: Option<f64>,

    /// Read unit states from the `systemctl list-units` table
    #[arg(long, conflicts_with = "properties")]
    pub cli: bool,

    /// Read unit states with `systemctl show`
    #[arg(long)]
    pub properties: bool,

    /// Query the user manager
    #[arg(long)]
    pub user: bool,

    /// Timeout for each external command in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Append performance data
    #[arg(short = 'P', long, conflicts_with = "no_performance_data")]
    pub performance_data: bool,

    /// Omit performance data
    #[arg(short = 'p', long)]
    pub no_performance_data: bool,

    /// Configuration file (default: /etc/unitcheck/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output; repeat for log messages on stderr
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Override file options with the flags given on the command line.
    pub fn apply(&self, options: &mut CheckOptions) {
        let units = &mut options.units;
        if let Some(unit) = &self.unit {
            units.unit = Some(unit.clone());
        }
        if !self.include.is_empty() {
            units.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            units.exclude = self.exclude.clone();
        }
        if !self.include_type.is_empty() {
            units.include_type = self.include_type.clone();
        }
        if !self.exclude_type.is_empty() {
            units.exclude_type = self.exclude_type.clone();
        }
        if self.ignore_inactive_state {
            units.ignore_inactive_state = true;
        }

        if self.warning.is_some() {
            options.startup.warning = self.warning;
        }
        if self.critical.is_some() {
            options.startup.critical = self.critical;
        }
        if self.no_startup_time {
            options.startup.enabled = false;
        }

        if self.timers {
            options.timers.enabled = true;
        }
        if self.timers_warning.is_some() {
            options.timers.warning = self.timers_warning;
        }
        if self.timers_critical.is_some() {
            options.timers.critical = self.timers_critical;
        }

        if self.cli {
            options.acquisition.source = DataSource::Cli;
        }
        if self.properties {
            options.acquisition.source = DataSource::Properties;
        }
        if self.user {
            options.acquisition.user = true;
        }
        if let Some(timeout) = self.timeout {
            options.acquisition.timeout_secs = timeout;
        }

        if self.performance_data {
            options.performance_data = true;
        }
        if self.no_performance_data {
            options.performance_data = false;
        }
    }

    /// Detail lines are shown from the first `-v`
    pub fn verbose_output(&self) -> bool {
        self.verbose > 0
    }
}

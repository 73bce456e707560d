//! Configuration file loading.
//!
//! Config file: /etc/unitcheck/config.toml (optional)
//!
//! ```toml
//! performance_data = true
//!
//! [units]
//! exclude = ["user@"]
//!
//! [startup]
//! warning = 90.0
//! critical = 180.0
//!
//! [timers]
//! enabled = true
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use unitcheck_shared::CheckOptions;

/// System config path: /etc/unitcheck/config.toml
pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/unitcheck/config.toml")
}

/// Parse options from TOML text.
pub fn parse_options(contents: &str) -> Result<CheckOptions> {
    toml::from_str(contents).context("Invalid configuration")
}

/// Load options from a file.
pub fn load_from(path: &Path) -> Result<CheckOptions> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let options = parse_options(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!("loaded configuration from {}", path.display());
    Ok(options)
}

/// Load configuration
///
/// An explicitly requested file must exist. Without one, the system file is
/// used if present, otherwise defaults.
pub fn load(explicit: Option<&Path>) -> Result<CheckOptions> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    let system_path = system_config_path();
    if system_path.exists() {
        return load_from(&system_path);
    }

    Ok(CheckOptions::default())
}

//! Common functionality for unitcheck: configuration, logging, and acquiring
//! systemd state through external commands.

pub mod acquire;
pub mod config;
pub mod logging;
pub mod runner;
pub mod source;

pub use acquire::collect;
pub use runner::{CommandOutput, CommandRunner, RunError, SystemRunner};
pub use source::{source_for, PropertySource, TableSource, UnitSource};

//! Unitcheck library - exposes the command-line surface for testing

pub mod cli;
pub mod runtime;

pub use cli::Cli;

// Version is embedded at build time
pub const VERSION: &str = env!("UNITCHECK_VERSION");

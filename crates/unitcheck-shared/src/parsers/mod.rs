//! Parsers for systemd command output.
//!
//! # Supported Sources
//!
//! - `systemctl list-units` / `systemctl list-timers`: aligned tables → `Table`
//! - `systemd-analyze`: boot time → `StartupStatus`
//! - `systemctl show`: property blocks → `Vec<PropertyBlock>`
//!
//! Block-level failures (no header, missing column) are returned as
//! `ParseError`. Rows that do not follow the header geometry are skipped and
//! reported through `Table::issues`.

pub mod analyze;
pub mod atoms;
pub mod duration;
pub mod properties;
pub mod table;

pub use analyze::{parse_startup, StartupStatus};
pub use atoms::{round_millis, ParseError, ParseErrorReason};
pub use duration::parse_timespan;
pub use properties::{parse_property_blocks, PropertyBlock, PropertyBlocks};
pub use table::{Layout, Row, Table};

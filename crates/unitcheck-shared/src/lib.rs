//! Check engine for systemd health.
//!
//! Parses the text printed by `systemctl` and `systemd-analyze`, classifies
//! units, startup time and timers, and reduces everything to one monitoring
//! plugin result. Nothing in this crate spawns processes or logs; acquisition
//! lives in `unitcheck_common`.

pub mod aggregate;
pub mod check;
pub mod error;
pub mod filter;
pub mod options;
pub mod parsers;
pub mod severity;
pub mod timer;
pub mod unit;

pub use aggregate::{Aggregator, CheckReport, OkSummary};
pub use check::{error_report, evaluate, unit_filters, Snapshot};
pub use error::CheckError;
pub use filter::{matches_any, NameFilter, NameList, UnitTypes};
pub use options::{CheckOptions, DataSource};
pub use severity::{classify_dead_timer, classify_scalar, classify_unit, Severity, Thresholds};
pub use timer::{TimerRecord, TimerTable};
pub use unit::{LoadedUnits, UnitRecord, UnitRegistry};

//! Severity levels and the classification rules that produce them.

use crate::timer::TimerRecord;
use crate::unit::UnitRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plugin state, ordered by urgency. UNKNOWN ranks highest because it means
/// the check itself could not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Monitoring plugin exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds of the OK and WARNING ranges, in seconds. `None` disables
/// that level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
}

impl Thresholds {
    pub fn new(warning: Option<f64>, critical: Option<f64>) -> Self {
        Self { warning, critical }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.critical.is_none()
    }

    /// Threshold that `severity` violated, if any.
    pub fn violated(&self, severity: Severity) -> Option<f64> {
        match severity {
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            _ => None,
        }
    }
}

/// Classify a unit by its state facets.
///
/// `error` load state and `failed` active state are always CRITICAL. Without
/// `ignore_inactive`, every active state other than `active` is CRITICAL as
/// well. A facet that was not probed never causes a failure.
pub fn classify_unit(record: &UnitRecord, ignore_inactive: bool) -> Severity {
    let load = record.load_state.as_deref();
    let active = record.active_state.as_deref();

    if load == Some("error") || active == Some("failed") {
        return Severity::Critical;
    }
    if ignore_inactive {
        return Severity::Ok;
    }
    match active {
        Some("active") | None => Severity::Ok,
        Some(_) => Severity::Critical,
    }
}

/// Classify a measurement against thresholds. A value must strictly exceed a
/// threshold to reach its level.
pub fn classify_scalar(value: f64, thresholds: &Thresholds) -> Severity {
    if thresholds.critical.is_some_and(|crit| value > crit) {
        Severity::Critical
    } else if thresholds.warning.is_some_and(|warn| value > warn) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// Classify a timer that has no next run scheduled.
///
/// A timer that never ran is CRITICAL. Otherwise the elapsed time since its
/// last run is compared with `>=`, so a value on a threshold reaches that
/// level. Timers with a scheduled next run are OK.
pub fn classify_dead_timer(timer: &TimerRecord, thresholds: &Thresholds) -> Severity {
    if !timer.is_unscheduled() {
        return Severity::Ok;
    }
    let Some(elapsed) = timer.passed_seconds() else {
        return Severity::Critical;
    };

    if thresholds.critical.is_some_and(|crit| elapsed >= crit) {
        Severity::Critical
    } else if thresholds.warning.is_some_and(|warn| elapsed >= warn) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

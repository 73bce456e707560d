//! Timer rows from `systemctl list-timers`.

use crate::filter::NameFilter;
use crate::parsers::{parse_timespan, ParseError, Row, Table};
use serde::{Deserialize, Serialize};

/// Sentinel systemd prints for a field without a value.
pub const NOT_APPLICABLE: &str = "n/a";

/// Columns required to evaluate timers.
pub const TIMER_COLUMNS: &[&str] = &["next", "passed", "unit"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub unit: String,
    pub next: String,
    pub left: String,
    pub last: String,
    pub passed: String,
    pub activates: String,
}

impl TimerRecord {
    fn from_row(row: &Row) -> Option<Self> {
        let field = |key: &str| row.get(key).unwrap_or_default().to_string();
        let unit = row.non_empty("unit")?.to_string();
        Some(Self {
            unit,
            next: field("next"),
            left: field("left"),
            last: field("last"),
            passed: field("passed"),
            activates: field("activates"),
        })
    }

    /// True when no next run is scheduled.
    pub fn is_unscheduled(&self) -> bool {
        self.next == NOT_APPLICABLE
    }

    /// Seconds since the last run, or `None` if the timer never ran.
    pub fn passed_seconds(&self) -> Option<f64> {
        if self.passed == NOT_APPLICABLE || self.passed.is_empty() {
            return None;
        }
        Some(parse_timespan(&self.passed))
    }
}

/// Timers parsed from `systemctl list-timers --all`, plus skipped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerTable {
    pub timers: Vec<TimerRecord>,
    pub issues: Vec<ParseError>,
}

impl TimerTable {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let table = Table::parse_expecting("systemctl list-timers", text, TIMER_COLUMNS)?;
        Ok(Self {
            timers: timers_from_table(&table),
            issues: table.issues(),
        })
    }

    /// Timers not matched by `exclude`.
    pub fn retained<'a>(
        &'a self,
        exclude: Option<&'a NameFilter>,
    ) -> impl Iterator<Item = &'a TimerRecord> + 'a {
        self.timers
            .iter()
            .filter(move |t| !exclude.is_some_and(|f| f.matches_any(&t.unit)))
    }
}

pub fn timers_from_table(table: &Table) -> Vec<TimerRecord> {
    table.rows().filter_map(|row| TimerRecord::from_row(&row)).collect()
}

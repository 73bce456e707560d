//! The evaluation pass: acquired state in, one plugin report out.

use crate::aggregate::{Aggregator, CheckReport, OkSummary};
use crate::error::CheckError;
use crate::filter::{NameFilter, UnitTypes};
use crate::options::{CheckOptions, DataSource};
use crate::parsers::{ParseError, StartupStatus};
use crate::severity::{classify_dead_timer, classify_unit};
use crate::timer::TimerTable;
use crate::unit::{LoadedUnits, StateCounter, UnitRecord, UnitRegistry};

/// States that always get a `units_<state>` metric, in this order.
const STANDARD_STATES: &[&str] = &["activating", "active", "failed", "inactive"];

/// Everything acquired for one check run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub source: DataSource,
    pub units: UnitRegistry,
    /// `None` when startup time was not acquired
    pub startup: Option<StartupStatus>,
    /// `None` when timers were not acquired
    pub timers: Option<TimerTable>,
    /// Rows skipped while parsing
    pub issues: Vec<ParseError>,
}

impl Snapshot {
    pub fn new(source: DataSource, loaded: LoadedUnits) -> Self {
        Self {
            source,
            units: loaded.registry,
            startup: None,
            timers: None,
            issues: loaded.issues,
        }
    }

    pub fn with_startup(mut self, startup: StartupStatus) -> Self {
        self.startup = Some(startup);
        self
    }

    pub fn with_timers(mut self, mut timers: TimerTable) -> Self {
        self.issues.append(&mut timers.issues);
        self.timers = Some(timers);
        self
    }
}

/// Report for a failure before evaluation could start.
pub fn error_report(error: CheckError) -> CheckReport {
    let mut aggregator = Aggregator::default();
    aggregator.record_error(error);
    aggregator.finalize(false)
}

/// Compile the include and exclude filters, unit types included.
pub fn unit_filters(options: &CheckOptions) -> Result<(NameFilter, NameFilter), CheckError> {
    let units = &options.units;

    let mut include = units.include.clone();
    include.extend(UnitTypes::new(&units.include_type).pattern());
    let mut exclude = units.exclude.clone();
    exclude.extend(UnitTypes::new(&units.exclude_type).pattern());

    Ok((NameFilter::new(&include)?, NameFilter::new(&exclude)?))
}

fn unit_hint(record: &UnitRecord) -> String {
    format!(
        "{}: {}",
        record.name,
        record.active_state.as_deref().unwrap_or("unknown")
    )
}

/// Evaluate a snapshot.
///
/// Invalid patterns and an empty selection make the result UNKNOWN before
/// anything is classified. Skipped rows are reported in the verbose details
/// but never change the severity.
pub fn evaluate(options: &CheckOptions, snapshot: &Snapshot) -> CheckReport {
    let performance_data = options.performance_data;

    let (include, exclude) = match unit_filters(options) {
        Ok(filters) => filters,
        Err(err) => return error_report(err),
    };

    let ok_summary = match options.units.unit {
        Some(_) => OkSummary::Hints,
        None => OkSummary::Marker,
    };
    let mut aggregator = Aggregator::new(ok_summary);

    // Units
    let selected: Vec<&UnitRecord> = match &options.units.unit {
        Some(name) => match snapshot.units.get(name) {
            Ok(record) => vec![record],
            Err(_) => return error_report(CheckError::EmptySelection),
        },
        None => snapshot
            .units
            .list(Some(&include), Some(&exclude))
            .collect(),
    };
    if selected.is_empty() {
        return error_report(CheckError::EmptySelection);
    }

    // A full listing always contains inactive units; only a single unit
    // honours the operator's choice.
    let ignore_inactive = options.units.unit.is_none() || options.units.ignore_inactive_state;

    let mut states = StateCounter::new();
    for record in &selected {
        let severity = classify_unit(record, ignore_inactive);
        aggregator.record_with_hint(&record.name, severity, &unit_hint(record));
        states.add(record.active_state.as_deref().unwrap_or("unknown"));
    }

    aggregator.record_metric("count_units", selected.len());
    aggregator.record_metric("data_source", snapshot.source.to_string().as_str());

    // Startup time
    if let Some(seconds) = snapshot.startup.and_then(|s| s.seconds()) {
        if options.startup.enabled {
            aggregator.record_scalar("startup_time", seconds, options.startup.thresholds());
        } else {
            aggregator.record_metric("startup_time", seconds);
        }
    }

    for state in STANDARD_STATES {
        aggregator.record_metric(&format!("units_{}", state), states.get(state));
    }
    for (state, count) in states.iter() {
        if !STANDARD_STATES.contains(&state) {
            aggregator.record_metric(&format!("units_{}", state), count);
        }
    }

    // Dead timers
    if options.timers.enabled {
        if let Some(timers) = &snapshot.timers {
            let thresholds = options.timers.thresholds();
            for timer in timers.retained(Some(&exclude)) {
                if timer.is_unscheduled() {
                    let severity = classify_dead_timer(timer, &thresholds);
                    aggregator.record(&timer.unit, severity);
                }
            }
        }
    }

    for issue in &snapshot.issues {
        aggregator.record_issue(issue);
    }

    aggregator.finalize(performance_data)
}

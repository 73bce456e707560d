//! Gather everything one check run needs into a `Snapshot`.

use crate::runner::CommandRunner;
use crate::source::{manager_args, UnitSource};
use tracing::{debug, info, warn};
use unitcheck_shared::parsers::{parse_startup, ParseError, StartupStatus};
use unitcheck_shared::{CheckError, CheckOptions, Snapshot, TimerTable};

const NOT_FINISHED: &str = "Bootup is not yet finished";

fn startup(runner: &dyn CommandRunner, options: &CheckOptions) -> Result<StartupStatus, CheckError> {
    let output = runner.run("systemd-analyze", &manager_args(options, &[]))?;

    // systemd-analyze exits non-zero while the boot is still running
    if output.stdout.contains(NOT_FINISHED) || output.stderr.contains(NOT_FINISHED) {
        return Ok(StartupStatus::NotFinished);
    }
    let text = output.into_stdout()?;
    parse_startup(&text).map_err(|err| CheckError::Acquisition(err.to_string()))
}

fn timers(runner: &dyn CommandRunner, options: &CheckOptions) -> Result<TimerTable, CheckError> {
    let args = manager_args(options, &["list-timers", "--all"]);
    let text = runner.run("systemctl", &args)?.into_stdout()?;
    Ok(TimerTable::parse(&text)?)
}

fn log_issues(issues: &[ParseError]) {
    for issue in issues {
        warn!("skipped row: {} ({:?})", issue, issue.raw.trim());
    }
}

/// Acquire units, startup time and timers as the options require.
pub fn collect(
    source: &dyn UnitSource,
    runner: &dyn CommandRunner,
    options: &CheckOptions,
) -> Result<Snapshot, CheckError> {
    let loaded = source.load_units(options)?;
    info!(
        "loaded {} units from {}",
        loaded.registry.count(),
        source.kind()
    );
    let mut snapshot = Snapshot::new(source.kind(), loaded);

    if options.startup.enabled {
        let status = startup(runner, options)?;
        debug!("startup: {:?}", status);
        snapshot = snapshot.with_startup(status);
    }

    if options.timers.enabled {
        let table = timers(runner, options)?;
        debug!("loaded {} timers", table.timers.len());
        snapshot = snapshot.with_timers(table);
    }

    log_issues(&snapshot.issues);
    Ok(snapshot)
}

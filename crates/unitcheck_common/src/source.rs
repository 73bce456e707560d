//! Unit state backends.
//!
//! Two interchangeable ways to learn unit states, chosen by the caller:
//! parsing the `systemctl list-units` table, or querying properties with
//! `systemctl show`.

use crate::runner::CommandRunner;
use tracing::debug;
use unitcheck_shared::{
    unit_filters, CheckError, CheckOptions, DataSource, LoadedUnits, NameList,
};

/// Property names requested from `systemctl show`
const PROPERTIES: &str = "Id,ActiveState,SubState,LoadState";

/// Arguments for a `systemctl`/`systemd-analyze` call, addressed to the
/// user manager when requested.
pub fn manager_args(options: &CheckOptions, args: &[&str]) -> Vec<String> {
    let mut full = Vec::with_capacity(args.len() + 1);
    if options.acquisition.user {
        full.push("--user".to_string());
    }
    full.extend(args.iter().map(|a| a.to_string()));
    full
}

fn run_stdout(
    runner: &dyn CommandRunner,
    program: &str,
    args: Vec<String>,
) -> Result<String, CheckError> {
    let output = runner.run(program, &args)?;
    Ok(output.into_stdout()?)
}

pub trait UnitSource {
    fn kind(&self) -> DataSource;

    fn load_units(&self, options: &CheckOptions) -> Result<LoadedUnits, CheckError>;
}

/// Parses `systemctl list-units --all`
pub struct TableSource<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> TableSource<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl UnitSource for TableSource<'_> {
    fn kind(&self) -> DataSource {
        DataSource::Cli
    }

    fn load_units(&self, options: &CheckOptions) -> Result<LoadedUnits, CheckError> {
        let args = manager_args(options, &["list-units", "--all"]);
        let text = run_stdout(self.runner, "systemctl", args)?;
        Ok(LoadedUnits::from_table_text(&text)?)
    }
}

/// Lists unit names, then queries the selected units with `systemctl show`
pub struct PropertySource<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> PropertySource<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn unit_names(&self, options: &CheckOptions) -> Result<NameList, CheckError> {
        let args = manager_args(
            options,
            &["list-units", "--all", "--plain", "--no-legend"],
        );
        let text = run_stdout(self.runner, "systemctl", args)?;
        Ok(text
            .lines()
            .filter_map(|line| {
                line.trim_start_matches(|c: char| c == '●' || c.is_whitespace())
                    .split_whitespace()
                    .next()
            })
            .collect())
    }
}

impl UnitSource for PropertySource<'_> {
    fn kind(&self) -> DataSource {
        DataSource::Properties
    }

    fn load_units(&self, options: &CheckOptions) -> Result<LoadedUnits, CheckError> {
        let (include, exclude) = unit_filters(options)?;
        let names = self.unit_names(options)?;

        let selected: Vec<&str> = match &options.units.unit {
            Some(unit) => names.get(unit).into_iter().collect(),
            None => names.list(Some(&include), Some(&exclude)).collect(),
        };
        debug!("querying properties of {} of {} units", selected.len(), names.len());
        if selected.is_empty() {
            return Ok(LoadedUnits::default());
        }

        let property_arg = format!("--property={}", PROPERTIES);
        let mut args = vec!["show", property_arg.as_str()];
        args.extend(selected.iter().copied());
        let text = run_stdout(self.runner, "systemctl", manager_args(options, &args))?;
        Ok(LoadedUnits::from_properties_text(&text))
    }
}

/// Backend for a data source
pub fn source_for<'a>(kind: DataSource, runner: &'a dyn CommandRunner) -> Box<dyn UnitSource + 'a> {
    match kind {
        DataSource::Cli => Box::new(TableSource::new(runner)),
        DataSource::Properties => Box::new(PropertySource::new(runner)),
    }
}

//! Runtime - resolve options, acquire, evaluate and print
//!
//! Whatever goes wrong after argument parsing still ends in a plugin line
//! and a plugin exit code; only clap usage errors exit differently.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};
use unitcheck_common::logging::{self, LogLevel};
use unitcheck_common::{collect, config, source_for, CommandRunner, SystemRunner};
use unitcheck_shared::{
    error_report, evaluate, unit_filters, CheckOptions, CheckReport, Severity,
};

use crate::cli::Cli;

/// Configuration file first, command-line flags on top.
pub fn resolve_options(cli: &Cli) -> Result<CheckOptions> {
    let mut options = config::load(cli.config.as_deref())?;
    cli.apply(&mut options);
    Ok(options)
}

/// Run one check against whatever the runner returns.
pub fn check(options: &CheckOptions, runner: &dyn CommandRunner) -> CheckReport {
    // Bad patterns are reported without running any command
    if let Err(err) = unit_filters(options) {
        return error_report(err);
    }

    let source = source_for(options.acquisition.source, runner);
    match collect(source.as_ref(), runner, options) {
        Ok(snapshot) => evaluate(options, &snapshot),
        Err(err) => {
            warn!("{}", err);
            error_report(err)
        }
    }
}

/// Format a report for stdout.
pub fn render(report: &CheckReport, json: bool, verbose: bool) -> Result<String> {
    if json {
        report.to_json().context("Failed to serialize report")
    } else {
        Ok(report.render(verbose))
    }
}

/// Main entry point after CLI parsing. Returns the process exit code.
pub fn run(cli: Cli) -> i32 {
    logging::init(LogLevel::from_verbosity(cli.verbose));

    let options = match resolve_options(&cli) {
        Ok(options) => options,
        Err(err) => {
            println!("SYSTEMD UNKNOWN: {:#}", err);
            return Severity::Unknown.exit_code();
        }
    };
    debug!("options: {:?}", options);

    let runner = SystemRunner::new(Duration::from_secs(options.acquisition.timeout_secs));
    let report = check(&options, &runner);

    match render(&report, cli.json, cli.verbose_output()) {
        Ok(output) => {
            println!("{}", output);
            report.exit_code
        }
        Err(err) => {
            println!("SYSTEMD UNKNOWN: {:#}", err);
            Severity::Unknown.exit_code()
        }
    }
}

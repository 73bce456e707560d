//! check_systemd - monitoring plugin for systemd
//!
//! Prints one plugin line (or a JSON report) and exits with the plugin
//! status code.

use clap::Parser;
use unitcheck::cli::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(unitcheck::runtime::run(cli));
}

//! End-to-end tests: captured systemd output in, plugin line out.

use unitcheck_shared::parsers::parse_startup;
use unitcheck_shared::{
    evaluate, CheckOptions, DataSource, LoadedUnits, Severity, Snapshot, TimerTable,
};

const UNITS_OK: &str = include_str!("fixtures/list-units_ok.txt");
const UNITS_FAILED: &str = include_str!("fixtures/list-units_failed.txt");
const UNITS_MULTIPLE: &str = include_str!("fixtures/list-units_multiple-failure.txt");
const UNITS_REGEXP: &str = include_str!("fixtures/list-units_regexp-excludes.txt");
const UNITS_3: &str = include_str!("fixtures/list-units_3units.txt");
const UNITS_NOT_FOUND: &str = include_str!("fixtures/list-units_not-found.txt");
const UNITS_V246: &str = include_str!("fixtures/list-units_v246.txt");
const SHOW_PROPERTIES: &str = include_str!("fixtures/show_properties.txt");
const ANALYZE_1MIN: &str = include_str!("fixtures/analyze_1min.txt");
const ANALYZE_12: &str = include_str!("fixtures/analyze_12.345.txt");
const ANALYZE_RASPIAN: &str = include_str!("fixtures/analyze_raspian.txt");
const ANALYZE_NOT_FINISHED: &str = include_str!("fixtures/analyze_not-finished.txt");
const TIMERS_1: &str = include_str!("fixtures/list-timers_1.txt");
const TIMERS_2: &str = include_str!("fixtures/list-timers_2.txt");
const TIMERS_OK: &str = include_str!("fixtures/list-timers_ok.txt");
const TIMERS_ALL_NA: &str = include_str!("fixtures/list-timers_all-n-a.txt");

fn snapshot(units: &str, analyze: &str) -> Snapshot {
    let loaded = LoadedUnits::from_table_text(units).unwrap();
    Snapshot::new(DataSource::Cli, loaded).with_startup(parse_startup(analyze).unwrap())
}

fn timer_options(warning: Option<f64>, critical: Option<f64>) -> CheckOptions {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    options.timers.enabled = true;
    if warning.is_some() {
        options.timers.warning = warning;
    }
    if critical.is_some() {
        options.timers.critical = critical;
    }
    options
}

fn with_timers(timers: &str) -> Snapshot {
    snapshot(UNITS_3, ANALYZE_12).with_timers(TimerTable::parse(timers).unwrap())
}

#[test]
fn golden_all_clear_386_units() {
    let mut options = CheckOptions::default();
    options.startup.warning = Some(90.0);
    options.startup.critical = Some(180.0);

    let report = evaluate(&options, &snapshot(UNITS_OK, ANALYZE_1MIN));
    assert_eq!(report.severity, Severity::Ok);
    assert_eq!(
        report.render(false),
        "SYSTEMD OK - all | count_units=386 data_source=cli startup_time=62.154;90;180 \
         units_activating=0 units_active=275 units_failed=0 units_inactive=111"
    );
}

#[test]
fn golden_all_clear_verbose() {
    let report = evaluate(&CheckOptions::default(), &snapshot(UNITS_OK, ANALYZE_12));
    assert_eq!(
        report.render(true),
        "SYSTEMD OK - all\n\
         ok: all\n\
         ok: startup_time is 12.35\n\
         | count_units=386 data_source=cli startup_time=12.345;60;120 \
         units_activating=0 units_active=275 units_failed=0 units_inactive=111"
    );
}

#[test]
fn golden_single_failure() {
    let report = evaluate(&CheckOptions::default(), &snapshot(UNITS_FAILED, ANALYZE_12));
    assert_eq!(report.severity, Severity::Critical);
    assert_eq!(report.exit_code, 2);
    assert_eq!(
        report.render(false),
        "SYSTEMD CRITICAL - smartd.service: failed | count_units=3 data_source=cli \
         startup_time=12.345;60;120 units_activating=0 units_active=1 units_failed=1 \
         units_inactive=1"
    );
}

#[test]
fn golden_multiple_failures_in_order() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    let report = evaluate(&options, &snapshot(UNITS_MULTIPLE, ANALYZE_RASPIAN));
    assert_eq!(
        report.render(true),
        "SYSTEMD CRITICAL - rtkit-daemon.service: failed, smartd.service: failed\n\
         critical: rtkit-daemon.service: failed\n\
         critical: smartd.service: failed\n\
         ok: startup_time is 46.29"
    );
}

#[test]
fn test_invalid_regex_is_unknown_regardless_of_data() {
    for units in [UNITS_OK, UNITS_FAILED] {
        let mut options = CheckOptions::default();
        options.units.exclude = vec!["*service".to_string()];
        let report = evaluate(&options, &snapshot(units, ANALYZE_12));
        assert_eq!(report.severity, Severity::Unknown);
        assert_eq!(
            report.render(false),
            "SYSTEMD UNKNOWN: Invalid regular expression: '*service'"
        );
    }
}

#[test]
fn test_exclude_failed_unit() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    options.units.exclude = vec![r"user@\d+\.service".to_string()];
    let report = evaluate(&options, &snapshot(UNITS_REGEXP, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD OK - all");

    options.units.exclude = vec!["user@".to_string(), "nginx".to_string()];
    let report = evaluate(&options, &snapshot(UNITS_REGEXP, ANALYZE_12));
    assert_eq!(report.severity, Severity::Ok);
}

#[test]
fn test_include_selects_failed_unit() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    options.units.include = vec!["user".to_string()];
    let report = evaluate(&options, &snapshot(UNITS_REGEXP, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD CRITICAL - user@1000.service: failed");
}

#[test]
fn test_single_unit() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    options.units.unit = Some("nginx.service".to_string());
    let report = evaluate(&options, &snapshot(UNITS_FAILED, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD OK - nginx.service: active");

    options.units.unit = Some("smartd.service".to_string());
    let report = evaluate(&options, &snapshot(UNITS_FAILED, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD CRITICAL - smartd.service: failed");
}

#[test]
fn test_not_found_state_is_counted() {
    let report = evaluate(&CheckOptions::default(), &snapshot(UNITS_NOT_FOUND, ANALYZE_12));
    assert_eq!(report.severity, Severity::Ok);
    assert!(report
        .metrics
        .unwrap_or_default()
        .ends_with("units_inactive=0 units_not-found=1"));
}

#[test]
fn test_systemd_v246_layout() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    let report = evaluate(&options, &snapshot(UNITS_V246, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD CRITICAL - nm-wait-online.service: failed");
}

#[test]
fn test_startup_thresholds() {
    let mut options = CheckOptions::default();
    options.performance_data = false;
    options.startup.critical = Some(1.0);
    let report = evaluate(&options, &snapshot(UNITS_OK, ANALYZE_12));
    assert_eq!(
        report.render(false),
        "SYSTEMD CRITICAL - startup_time is 12.35 (outside range 0:1)"
    );

    options.startup.critical = Some(120.0);
    options.startup.warning = Some(2.0);
    let report = evaluate(&options, &snapshot(UNITS_OK, ANALYZE_12));
    assert_eq!(
        report.render(false),
        "SYSTEMD WARNING - startup_time is 12.35 (outside range 0:2)"
    );

    options.startup.enabled = false;
    options.startup.warning = Some(2.0);
    let report = evaluate(&options, &snapshot(UNITS_OK, ANALYZE_12));
    assert_eq!(report.render(false), "SYSTEMD OK - all");
}

#[test]
fn test_boot_not_finished() {
    let report = evaluate(&CheckOptions::default(), &snapshot(UNITS_OK, ANALYZE_NOT_FINISHED));
    assert_eq!(report.severity, Severity::Ok);
    assert!(!report.metrics.unwrap_or_default().contains("startup_time"));
}

#[test]
fn test_properties_source() {
    let loaded = LoadedUnits::from_properties_text(SHOW_PROPERTIES);
    let snap = Snapshot::new(DataSource::Properties, loaded);
    let report = evaluate(&CheckOptions::default(), &snap);
    assert_eq!(
        report.render(false),
        "SYSTEMD CRITICAL - smartd.service: failed | count_units=3 data_source=properties \
         units_activating=0 units_active=1 units_failed=1 units_inactive=1"
    );
}

#[test]
fn test_dead_timer_never_ran() {
    let report = evaluate(&timer_options(None, None), &with_timers(TIMERS_1));
    assert_eq!(report.exit_code, 2);
    assert_eq!(report.render(false), "SYSTEMD CRITICAL - phpsessionclean.timer");
}

#[test]
fn test_dead_timers_elapsed() {
    let report = evaluate(&timer_options(None, None), &with_timers(TIMERS_2));
    assert_eq!(
        report.render(false),
        "SYSTEMD CRITICAL - dfm-auto-jf.timer, rsync.timer"
    );
}

#[test]
fn test_dead_timer_boundaries() {
    // Both dead timers last ran 2764800 s ago
    let above = evaluate(
        &timer_options(Some(2_764_801.0), Some(2_764_802.0)),
        &with_timers(TIMERS_2),
    );
    assert_eq!(above.exit_code, 0);

    let below = evaluate(
        &timer_options(Some(2_764_799.0), Some(2_764_802.0)),
        &with_timers(TIMERS_2),
    );
    assert_eq!(below.exit_code, 1);

    let equal_warning = evaluate(
        &timer_options(Some(2_764_800.0), Some(2_764_802.0)),
        &with_timers(TIMERS_2),
    );
    assert_eq!(equal_warning.exit_code, 1);

    let equal_critical = evaluate(
        &timer_options(Some(2_764_700.0), Some(2_764_800.0)),
        &with_timers(TIMERS_2),
    );
    assert_eq!(equal_critical.exit_code, 2);
}

#[test]
fn test_dead_timers_excluded() {
    let mut options = timer_options(None, None);
    options.units.exclude = vec!["dfm-auto-jf.timer".to_string()];
    let report = evaluate(&options, &with_timers(TIMERS_2));
    assert_eq!(report.render(false), "SYSTEMD CRITICAL - rsync.timer");

    options.units.exclude.push("rsync.timer".to_string());
    let report = evaluate(&options, &with_timers(TIMERS_2));
    assert_eq!(report.exit_code, 0);
}

#[test]
fn test_timers_ok() {
    let report = evaluate(&timer_options(None, None), &with_timers(TIMERS_OK));
    assert_eq!(report.render(false), "SYSTEMD OK - all");
}

#[test]
fn test_narrow_timer_table() {
    let report = evaluate(&timer_options(None, None), &with_timers(TIMERS_ALL_NA));
    assert_eq!(
        report.render(false),
        "SYSTEMD CRITICAL - systemd-readahead-done.timer, systemd-readahead-done.timer"
    );
}

#[test]
fn test_timers_ignored_when_disabled() {
    let mut options = timer_options(None, None);
    options.timers.enabled = false;
    let report = evaluate(&options, &with_timers(TIMERS_1));
    assert_eq!(report.exit_code, 0);
}

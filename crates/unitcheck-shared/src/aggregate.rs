//! Reduce per-entity severities and measurements to one plugin result.
//!
//! Output follows the monitoring plugin convention:
//!
//! ```text
//! SYSTEMD CRITICAL - smartd.service: failed | count_units=3 units_failed=1
//! ```

use crate::error::CheckError;
use crate::parsers::ParseError;
use crate::severity::{classify_scalar, Severity, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

const PLUGIN_NAME: &str = "SYSTEMD";
const ALL_CLEAR: &str = "all";

/// What the summary shows when everything is OK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OkSummary {
    /// The all-clear marker `all`
    #[default]
    Marker,
    /// The hints of the OK entities, e.g. `nginx.service: active`
    Hints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub entity: String,
    pub severity: Severity,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(usize),
    Seconds(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Seconds(s) => write!(f, "{}", s),
            MetricValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<usize> for MetricValue {
    fn from(n: usize) -> Self {
        MetricValue::Count(n)
    }
}

impl From<f64> for MetricValue {
    fn from(s: f64) -> Self {
        MetricValue::Seconds(s)
    }
}

impl From<&str> for MetricValue {
    fn from(t: &str) -> Self {
        MetricValue::Text(t.to_string())
    }
}

/// One performance data item: `name=value[;warn;crit]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    pub thresholds: Thresholds,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if !self.thresholds.is_empty() {
            let level = |t: Option<f64>| t.map(|v| v.to_string()).unwrap_or_default();
            write!(
                f,
                ";{};{}",
                level(self.thresholds.warning),
                level(self.thresholds.critical)
            )?;
        }
        Ok(())
    }
}

/// Final result of a check pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub severity: Severity,
    pub summary: String,
    /// Performance data, `None` when disabled
    pub metrics: Option<String>,
    /// Verbose detail lines
    pub details: Vec<String>,
    /// Hard error that made the result UNKNOWN
    pub error: Option<String>,
    pub exit_code: i32,
}

impl CheckReport {
    /// Status line, e.g. `SYSTEMD OK - all`.
    pub fn status_line(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{} {}: {}", PLUGIN_NAME, self.severity, error);
        }
        format!("{} {} - {}", PLUGIN_NAME, self.severity, self.summary)
    }

    /// Render for stdout. Verbose output puts detail lines between the
    /// status line and the performance data.
    pub fn render(&self, verbose: bool) -> String {
        let status = self.status_line();
        let metrics = self.metrics.as_deref().filter(|m| !m.is_empty());

        if !verbose {
            return match metrics {
                Some(m) => format!("{} | {}", status, m),
                None => status,
            };
        }

        let mut lines = vec![status];
        lines.extend(self.details.iter().cloned());
        if let Some(m) = metrics {
            lines.push(format!("| {}", m));
        }
        lines.join("\n")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Collects findings and metrics across one check pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    ok_summary: OkSummary,
    findings: Vec<Finding>,
    /// Hints of measurements that stayed within range
    measurements: Vec<String>,
    metrics: Vec<Metric>,
    issues: Vec<String>,
    error: Option<CheckError>,
}

impl Aggregator {
    pub fn new(ok_summary: OkSummary) -> Self {
        Self {
            ok_summary,
            ..Self::default()
        }
    }

    /// Record an entity using its id as hint.
    pub fn record(&mut self, entity: &str, severity: Severity) {
        self.record_with_hint(entity, severity, entity);
    }

    pub fn record_with_hint(&mut self, entity: &str, severity: Severity, hint: &str) {
        self.findings.push(Finding {
            entity: entity.to_string(),
            severity,
            hint: hint.to_string(),
        });
    }

    /// Add a metric. A metric with the same name keeps its first position but
    /// takes the new value.
    pub fn record_metric(&mut self, name: &str, value: impl Into<MetricValue>) {
        self.record_metric_with_thresholds(name, value, Thresholds::none());
    }

    pub fn record_metric_with_thresholds(
        &mut self,
        name: &str,
        value: impl Into<MetricValue>,
        thresholds: Thresholds,
    ) {
        let metric = Metric {
            name: name.to_string(),
            value: value.into(),
            thresholds,
        };
        match self.metrics.iter_mut().find(|m| m.name == name) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    /// Classify a measurement, record it as a metric and, when out of range,
    /// as a finding.
    pub fn record_scalar(&mut self, name: &str, value: f64, thresholds: Thresholds) -> Severity {
        let severity = classify_scalar(value, &thresholds);
        let mut hint = format!("{} is {:.2}", name, value);
        match thresholds.violated(severity) {
            Some(limit) => {
                hint.push_str(&format!(" (outside range 0:{})", limit));
                self.record_with_hint(name, severity, &hint);
            }
            None => self.measurements.push(hint),
        }
        self.record_metric_with_thresholds(name, value, thresholds);
        severity
    }

    /// Record a row skipped while parsing. Issues do not change severity.
    pub fn record_issue(&mut self, issue: &ParseError) {
        self.issues.push(issue.to_string());
    }

    /// Record a hard error. The result becomes UNKNOWN with the error as
    /// message, whatever else was recorded.
    pub fn record_error(&mut self, error: CheckError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn overall_severity(&self) -> Severity {
        if self.error.is_some() {
            return Severity::Unknown;
        }
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    fn summary(&self, severity: Severity) -> String {
        let hints: Vec<&str> = if severity == Severity::Ok {
            match self.ok_summary {
                OkSummary::Marker => Vec::new(),
                OkSummary::Hints => self.findings.iter().map(|f| f.hint.as_str()).collect(),
            }
        } else {
            self.non_ok().map(|f| f.hint.as_str()).collect()
        };

        if hints.is_empty() {
            ALL_CLEAR.to_string()
        } else {
            hints.join(", ")
        }
    }

    fn non_ok(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity != Severity::Ok)
    }

    fn details(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .non_ok()
            .map(|f| format!("{}: {}", f.severity.as_str().to_lowercase(), f.hint))
            .collect();
        if lines.is_empty() {
            lines.push(format!("ok: {}", ALL_CLEAR));
        }
        lines.extend(self.measurements.iter().map(|m| format!("ok: {}", m)));
        lines.extend(self.issues.iter().map(|i| format!("skipped: {}", i)));
        lines
    }

    /// Produce the report. Performance data is omitted when
    /// `performance_data` is false.
    pub fn finalize(self, performance_data: bool) -> CheckReport {
        let severity = self.overall_severity();

        if let Some(error) = &self.error {
            return CheckReport {
                severity,
                summary: error.to_string(),
                metrics: None,
                details: Vec::new(),
                error: Some(error.to_string()),
                exit_code: severity.exit_code(),
            };
        }

        let metrics = performance_data.then(|| {
            self.metrics
                .iter()
                .map(Metric::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        });

        CheckReport {
            severity,
            summary: self.summary(severity),
            metrics,
            details: self.details(),
            error: None,
            exit_code: severity.exit_code(),
        }
    }
}

//! Unit records and the per-check unit registry.

use crate::error::CheckError;
use crate::filter::{is_selected, NameFilter};
use crate::parsers::{parse_property_blocks, ParseError, PropertyBlock, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One systemd unit: its name and three state facets.
///
/// A facet that was not probed is `None`, never a made-up state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub name: String,
    pub active_state: Option<String>,
    pub sub_state: Option<String>,
    pub load_state: Option<String>,
}

impl UnitRecord {
    pub fn new(
        name: &str,
        active_state: Option<&str>,
        sub_state: Option<&str>,
        load_state: Option<&str>,
    ) -> Result<Self, CheckError> {
        if name.trim().is_empty() {
            return Err(CheckError::InvalidUnit("empty unit name".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            active_state: active_state.map(str::to_string),
            sub_state: sub_state.map(str::to_string),
            load_state: load_state.map(str::to_string),
        })
    }

    /// Build a record from a `systemctl show` property block.
    pub fn from_properties(block: &PropertyBlock) -> Result<Self, CheckError> {
        let name = block.get("Id").map(String::as_str).unwrap_or_default();
        Self::new(
            name,
            non_empty(block.get("ActiveState")),
            non_empty(block.get("SubState")),
            non_empty(block.get("LoadState")),
        )
    }

    /// Facet by name: `active_state`, `sub_state` or `load_state`.
    pub fn facet(&self, facet: &str) -> Option<&str> {
        match facet {
            "active_state" => self.active_state.as_deref(),
            "sub_state" => self.sub_state.as_deref(),
            "load_state" => self.load_state.as_deref(),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Units known to one check pass, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: Vec<UnitRecord>,
    index: HashMap<String, usize>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. A record with the same name replaces the earlier one in
    /// place.
    pub fn add(&mut self, record: UnitRecord) {
        match self.index.get(&record.name) {
            Some(&pos) => self.units[pos] = record,
            None => {
                self.index.insert(record.name.clone(), self.units.len());
                self.units.push(record);
            }
        }
    }

    /// Construct a record and add it.
    pub fn add_unit(
        &mut self,
        name: &str,
        active_state: Option<&str>,
        sub_state: Option<&str>,
        load_state: Option<&str>,
    ) -> Result<(), CheckError> {
        self.add(UnitRecord::new(name, active_state, sub_state, load_state)?);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&UnitRecord, CheckError> {
        self.index
            .get(name)
            .map(|&pos| &self.units[pos])
            .ok_or_else(|| CheckError::UnitNotFound(name.to_string()))
    }

    pub fn count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units matching `include` (if given and non-empty) and not matching
    /// `exclude` (if given and non-empty).
    pub fn list<'a>(
        &'a self,
        include: Option<&'a NameFilter>,
        exclude: Option<&'a NameFilter>,
    ) -> impl Iterator<Item = &'a UnitRecord> + 'a {
        self.units
            .iter()
            .filter(move |unit| is_selected(&unit.name, include, exclude))
    }

    /// Count units per `<facet>:<value>` key, e.g. `active_state:failed`.
    /// Malformed keys count zero.
    pub fn count_by_states(&self, keys: &[&str]) -> HashMap<String, usize> {
        keys.iter()
            .map(|key| {
                let count = match key.split_once(':') {
                    Some((facet, value)) => self
                        .units
                        .iter()
                        .filter(|unit| unit.facet(facet) == Some(value))
                        .count(),
                    None => 0,
                };
                (key.to_string(), count)
            })
            .collect()
    }
}

/// Open-ended per-state counter that keeps first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounter {
    counts: Vec<(String, usize)>,
}

impl StateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, state: &str) {
        match self.counts.iter_mut().find(|(s, _)| s == state) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((state.to_string(), 1)),
        }
    }

    pub fn get(&self, state: &str) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(s, c)| (s.as_str(), *c))
    }
}

/// Registry from a parsed `systemctl list-units` table.
///
/// Rows without a unit name are skipped. Malformed rows are left to the
/// caller through `Table::issues`.
pub fn registry_from_table(table: &Table) -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    for row in table.rows() {
        let Some(name) = row.non_empty("unit") else {
            continue;
        };
        if let Ok(record) = UnitRecord::new(
            name,
            row.non_empty("active"),
            row.non_empty("sub"),
            row.non_empty("load"),
        ) {
            registry.add(record);
        }
    }
    registry
}

/// Columns required in a `systemctl list-units` table.
pub const UNIT_COLUMNS: &[&str] = &["unit", "load", "active", "sub"];

/// Units read from one source, plus rows that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedUnits {
    pub registry: UnitRegistry,
    pub issues: Vec<ParseError>,
}

impl LoadedUnits {
    /// From `systemctl list-units --all` output.
    pub fn from_table_text(text: &str) -> Result<Self, ParseError> {
        let table = Table::parse_expecting("systemctl list-units", text, UNIT_COLUMNS)?;
        Ok(Self {
            registry: registry_from_table(&table),
            issues: table.issues(),
        })
    }

    /// From `systemctl show --property=Id,ActiveState,SubState,LoadState`
    /// output.
    pub fn from_properties_text(text: &str) -> Self {
        let parsed = parse_property_blocks(text);
        let mut registry = UnitRegistry::new();
        for block in &parsed.blocks {
            if let Ok(record) = UnitRecord::from_properties(block) {
                registry.add(record);
            }
        }
        Self {
            registry,
            issues: parsed.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UnitRegistry {
        let mut registry = UnitRegistry::new();
        registry
            .add_unit("nginx.service", Some("active"), Some("running"), Some("loaded"))
            .unwrap();
        registry
            .add_unit("smartd.service", Some("failed"), Some("failed"), Some("loaded"))
            .unwrap();
        registry
            .add_unit("ssh.service", Some("inactive"), Some("dead"), Some("loaded"))
            .unwrap();
        registry
    }

    fn names<'a>(units: impl Iterator<Item = &'a UnitRecord>) -> Vec<&'a str> {
        units.map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            UnitRecord::new("", Some("active"), None, None),
            Err(CheckError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_get() {
        let registry = sample();
        assert_eq!(
            registry.get("smartd.service").unwrap().active_state.as_deref(),
            Some("failed")
        );
        assert_eq!(
            registry.get("missing.service").unwrap_err(),
            CheckError::UnitNotFound("missing.service".to_string())
        );
    }

    #[test]
    fn test_overwrite_keeps_count() {
        let mut registry = sample();
        registry
            .add_unit("ssh.service", Some("active"), Some("running"), Some("loaded"))
            .unwrap();
        assert_eq!(registry.count(), 3);
        assert_eq!(
            registry.get("ssh.service").unwrap().active_state.as_deref(),
            Some("active")
        );
        assert_eq!(
            names(registry.list(None, None)),
            vec!["nginx.service", "smartd.service", "ssh.service"]
        );
    }

    #[test]
    fn test_list_without_filters_returns_all() {
        let registry = sample();
        let empty = NameFilter::default();
        assert_eq!(registry.list(None, None).count(), 3);
        assert_eq!(registry.list(Some(&empty), Some(&empty)).count(), 3);
    }

    #[test]
    fn test_list_include_exclude() {
        let registry = sample();
        let include = NameFilter::new(["nginx", "ssh"]).unwrap();
        let exclude = NameFilter::single("ssh").unwrap();
        assert_eq!(
            names(registry.list(Some(&include), Some(&exclude))),
            vec!["nginx.service"]
        );
    }

    #[test]
    fn test_include_and_exclude_partition() {
        let registry = sample();
        let pattern = NameFilter::single("s").unwrap();
        let mut all = names(registry.list(Some(&pattern), None));
        all.extend(names(registry.list(None, Some(&pattern))));
        all.sort();
        assert_eq!(all, vec!["nginx.service", "smartd.service", "ssh.service"]);
    }

    #[test]
    fn test_count_by_states() {
        let registry = sample();
        let counts = registry.count_by_states(&[
            "active_state:failed",
            "active_state:active",
            "load_state:loaded",
            "sub_state:exited",
            "bogus",
        ]);
        assert_eq!(counts["active_state:failed"], 1);
        assert_eq!(counts["active_state:active"], 1);
        assert_eq!(counts["load_state:loaded"], 3);
        assert_eq!(counts["sub_state:exited"], 0);
        assert_eq!(counts["bogus"], 0);
    }

    #[test]
    fn test_state_counter_is_open() {
        let mut counter = StateCounter::new();
        for state in ["active", "not-found", "active", "failed"] {
            counter.add(state);
        }
        assert_eq!(counter.get("active"), 2);
        assert_eq!(counter.get("not-found"), 1);
        assert_eq!(counter.get("reloading"), 0);
        assert_eq!(counter.total(), 4);
        let order: Vec<&str> = counter.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["active", "not-found", "failed"]);
    }

    #[test]
    fn test_from_properties() {
        let mut block = PropertyBlock::new();
        block.insert("Id".to_string(), "smartd.service".to_string());
        block.insert("ActiveState".to_string(), "failed".to_string());
        block.insert("SubState".to_string(), String::new());
        let record = UnitRecord::from_properties(&block).unwrap();
        assert_eq!(record.name, "smartd.service");
        assert_eq!(record.active_state.as_deref(), Some("failed"));
        assert_eq!(record.sub_state, None);
        assert_eq!(record.load_state, None);
    }

    #[test]
    fn test_registry_from_table() {
        let text = "  UNIT           LOAD   ACTIVE   SUB     DESCRIPTION
  nginx.service  loaded active   running web server
● smartd.service loaded failed   failed  SMART daemon
";
        let table = Table::parse(text).unwrap();
        let registry = registry_from_table(&table);
        assert_eq!(registry.count(), 2);
        let smartd = registry.get("smartd.service").unwrap();
        assert_eq!(smartd.load_state.as_deref(), Some("loaded"));
        assert_eq!(smartd.sub_state.as_deref(), Some("failed"));
    }

    #[test]
    fn test_loaded_units_from_properties() {
        let text = "Id=nginx.service\nActiveState=active\nSubState=running\nLoadState=loaded\n\nbroken\n";
        let loaded = LoadedUnits::from_properties_text(text);
        assert_eq!(loaded.registry.count(), 1);
        assert_eq!(loaded.issues.len(), 1);
    }

    #[test]
    fn test_loaded_units_requires_columns() {
        assert!(LoadedUnits::from_table_text("NAME  STATE\nfoo   bar\n").is_err());
    }
}

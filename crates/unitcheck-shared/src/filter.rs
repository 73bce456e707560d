//! Regular-expression name filters.
//!
//! Patterns are anchored at the start of the name only: `nginx` matches
//! `nginx.service`, while `service` does not. Append `$` for an exact match.

use crate::error::CheckError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A compiled set of patterns; a name matches if ANY pattern matches a prefix
/// of it.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl NameFilter {
    /// Compile a set of patterns. The first invalid pattern is reported
    /// verbatim.
    pub fn new<I, S>(patterns: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            // Validate the raw pattern first so wrapping cannot repair it
            let invalid = || CheckError::InvalidRegex(pattern.to_string());
            Regex::new(pattern).map_err(|_| invalid())?;
            let anchored = Regex::new(&format!("^(?:{})", pattern)).map_err(|_| invalid())?;
            filter.patterns.push(pattern.to_string());
            filter.compiled.push(anchored);
        }
        Ok(filter)
    }

    /// Filter with a single pattern.
    pub fn single(pattern: &str) -> Result<Self, CheckError> {
        Self::new([pattern])
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// True if any pattern matches a prefix of `name`. An empty filter
    /// matches nothing.
    pub fn matches_any(&self, name: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(name))
    }
}

/// One-shot form of `NameFilter::matches_any`.
pub fn matches_any<S: AsRef<str>>(name: &str, patterns: &[S]) -> Result<bool, CheckError> {
    Ok(NameFilter::new(patterns)?.matches_any(name))
}

/// Include/exclude decision shared by `UnitRegistry` and `NameList`.
///
/// An absent or empty filter imposes no restriction.
pub fn is_selected(name: &str, include: Option<&NameFilter>, exclude: Option<&NameFilter>) -> bool {
    let included = match include {
        Some(filter) if !filter.is_empty() => filter.matches_any(name),
        _ => true,
    };
    let excluded = match exclude {
        Some(filter) if !filter.is_empty() => filter.matches_any(name),
        _ => false,
    };
    included && !excluded
}

/// Ordered set of plain unit names, used to narrow which units are queried
/// for their properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameList {
    names: Vec<String>,
}

impl NameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; duplicates are ignored.
    pub fn add(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.iter().find(|n| *n == name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn list<'a>(
        &'a self,
        include: Option<&'a NameFilter>,
        exclude: Option<&'a NameFilter>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.names
            .iter()
            .map(String::as_str)
            .filter(move |name| is_selected(name, include, exclude))
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = NameList::new();
        for name in iter {
            list.add(name.as_ref());
        }
        list
    }
}

/// Unit types (`service`, `timer`, ...) turned into a name pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTypes {
    types: Vec<String>,
}

impl UnitTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            types: types
                .into_iter()
                .map(|t| t.as_ref().trim().trim_start_matches('.').to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Pattern matching names of any listed type, e.g.
    /// `.*\.(service|timer)$`. `None` when no type is listed.
    pub fn pattern(&self) -> Option<String> {
        if self.types.is_empty() {
            return None;
        }
        let alternatives: Vec<String> = self.types.iter().map(|t| regex::escape(t)).collect();
        Some(format!(r".*\.({})$", alternatives.join("|")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let filter = NameFilter::single("nginx").unwrap();
        assert!(filter.matches_any("nginx.service"));
        assert!(!filter.matches_any("php-nginx.service"));
    }

    #[test]
    fn test_any_pattern_matches() {
        let filter = NameFilter::new(["ssh", r".*\.timer"]).unwrap();
        assert!(filter.matches_any("ssh.service"));
        assert!(filter.matches_any("apt-daily.timer"));
        assert!(!filter.matches_any("nginx.service"));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = NameFilter::new(Vec::<String>::new()).unwrap();
        assert!(filter.is_empty());
        assert!(!filter.matches_any("nginx.service"));
        assert!(!matches_any::<&str>("nginx.service", &[]).unwrap());
    }

    #[test]
    fn test_invalid_pattern_reported_verbatim() {
        let err = NameFilter::new(["ssh", "*service"]).unwrap_err();
        assert_eq!(err, CheckError::InvalidRegex("*service".to_string()));
    }

    #[test]
    fn test_unbalanced_group_stays_invalid() {
        assert!(NameFilter::single(")(").is_err());
    }

    #[test]
    fn test_is_selected() {
        let include = NameFilter::single("ssh").unwrap();
        let exclude = NameFilter::single(r".*\.socket").unwrap();
        let empty = NameFilter::default();
        assert!(is_selected("ssh.service", Some(&include), Some(&exclude)));
        assert!(!is_selected("ssh.socket", Some(&include), Some(&exclude)));
        assert!(!is_selected("nginx.service", Some(&include), None));
        assert!(is_selected("nginx.service", Some(&empty), Some(&empty)));
        assert!(is_selected("nginx.service", None, None));
    }

    #[test]
    fn test_name_list() {
        let mut names: NameList = ["nginx.service", "ssh.service", "apt-daily.timer"]
            .into_iter()
            .collect();
        names.add("ssh.service");
        assert_eq!(names.len(), 3);
        assert_eq!(names.get("ssh.service"), Some("ssh.service"));
        assert_eq!(names.get("missing.service"), None);

        let exclude = NameFilter::single(r".*\.timer").unwrap();
        let listed: Vec<&str> = names.list(None, Some(&exclude)).collect();
        assert_eq!(listed, vec!["nginx.service", "ssh.service"]);
    }

    #[test]
    fn test_unit_types_pattern() {
        let types = UnitTypes::new(["service", "timer"]);
        let pattern = types.pattern().unwrap();
        assert_eq!(pattern, r".*\.(service|timer)$");

        let filter = NameFilter::single(&pattern).unwrap();
        assert!(filter.matches_any("nginx.service"));
        assert!(filter.matches_any("apt-daily.timer"));
        assert!(!filter.matches_any("ssh.socket"));
        assert!(!filter.matches_any("nginx.service.d"));
    }

    #[test]
    fn test_no_unit_types() {
        assert_eq!(UnitTypes::new(Vec::<&str>::new()).pattern(), None);
        assert_eq!(UnitTypes::new([" "]).pattern(), None);
    }
}

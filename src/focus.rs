//! Focus rules for narrowing resources by tag key and value

use crate::aws::tagging::Resource;
use crate::config::ConfigError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Inclusion/exclusion rule set applied per resource.
///
/// A resource passes iff it has at least one tag key in `include_keys`
/// (vacuously true when the set is empty), no tag key in `exclude_keys`, at
/// least one tag value in `include_values` (again vacuously true when
/// empty), and no tag value in `exclude_values`. With all four sets empty
/// every resource passes.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FocusRule {
    #[serde(default)]
    pub include_keys: BTreeSet<String>,
    #[serde(default)]
    pub exclude_keys: BTreeSet<String>,
    #[serde(default)]
    pub include_values: BTreeSet<String>,
    #[serde(default)]
    pub exclude_values: BTreeSet<String>,
}

impl FocusRule {
    /// Load a rule from a YAML file; omitted lists default to empty
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// True when no set constrains anything
    pub fn is_empty(&self) -> bool {
        self.include_keys.is_empty()
            && self.exclude_keys.is_empty()
            && self.include_values.is_empty()
            && self.exclude_values.is_empty()
    }

    /// The focus predicate for one resource
    pub fn matches(&self, resource: &Resource) -> bool {
        if !self.include_keys.is_empty()
            && !resource.tags.keys().any(|k| self.include_keys.contains(k))
        {
            return false;
        }
        if resource.tags.keys().any(|k| self.exclude_keys.contains(k)) {
            return false;
        }
        if !self.include_values.is_empty()
            && !resource
                .tags
                .values()
                .any(|v| self.include_values.contains(v))
        {
            return false;
        }
        if resource
            .tags
            .values()
            .any(|v| self.exclude_values.contains(v))
        {
            return false;
        }
        true
    }
}

/// Filter a resource sequence, preserving the original order.
pub fn apply(resources: &[Resource], rule: &FocusRule) -> Vec<Resource> {
    resources
        .iter()
        .filter(|r| rule.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(arn: &str, tags: &[(&str, &str)]) -> Resource {
        Resource {
            arn: arn.to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn rule(
        include_keys: &[&str],
        exclude_keys: &[&str],
        include_values: &[&str],
        exclude_values: &[&str],
    ) -> FocusRule {
        let to_set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        FocusRule {
            include_keys: to_set(include_keys),
            exclude_keys: to_set(exclude_keys),
            include_values: to_set(include_values),
            exclude_values: to_set(exclude_values),
        }
    }

    #[test]
    fn test_empty_rule_passes_everything() {
        let rule = FocusRule::default();
        assert!(rule.is_empty());
        assert!(rule.matches(&resource("arn:aws:ec2:eu-central-1:1:instance/i-1", &[])));
        assert!(rule.matches(&resource(
            "arn:aws:s3:::bucket",
            &[("team", "platform")]
        )));
    }

    #[test]
    fn test_include_keys_requires_a_matching_key() {
        let rule = rule(&["customer_function"], &[], &[], &[]);
        assert!(rule.matches(&resource("r1", &[("customer_function", "billing")])));
        assert!(!rule.matches(&resource("r2", &[("team", "platform")])));
        assert!(!rule.matches(&resource("r3", &[])));
    }

    #[test]
    fn test_exclude_value_wins_over_include_key() {
        // The worked example from the focus semantics: key matches the
        // include set, but one of the values is excluded.
        let rule = rule(&["customer_function"], &[], &[], &["platform"]);
        let r1 = resource(
            "r1",
            &[("customer_function", "billing"), ("team", "platform")],
        );
        assert!(!rule.matches(&r1));
    }

    #[test]
    fn test_exclude_only_behavior_with_empty_includes() {
        let rule = rule(&[], &["deprecated"], &[], &["scratch"]);
        assert!(rule.matches(&resource("r1", &[("team", "data")])));
        assert!(!rule.matches(&resource("r2", &[("deprecated", "yes")])));
        assert!(!rule.matches(&resource("r3", &[("purpose", "scratch")])));
        // No tags at all: nothing to exclude
        assert!(rule.matches(&resource("r4", &[])));
    }

    #[test]
    fn test_include_values() {
        let rule = rule(&[], &[], &["billing"], &[]);
        assert!(rule.matches(&resource("r1", &[("customer_function", "billing")])));
        assert!(!rule.matches(&resource("r2", &[("customer_function", "hr")])));
    }

    #[test]
    fn test_apply_preserves_order() {
        let rule = rule(&[], &["skip"], &[], &[]);
        let resources = vec![
            resource("a", &[("keep", "1")]),
            resource("b", &[("skip", "1")]),
            resource("c", &[("keep", "2")]),
            resource("d", &[]),
        ];

        let filtered = apply(&resources, &rule);
        let arns: Vec<_> = filtered.iter().map(|r| r.arn.as_str()).collect();
        assert_eq!(arns, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_load_with_defaults() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "include_keys:\n  - customer_function").unwrap();

        let rule = FocusRule::load(file.path()).unwrap();
        assert_eq!(rule.include_keys.len(), 1);
        assert!(rule.exclude_keys.is_empty());
        assert!(rule.include_values.is_empty());
        assert!(rule.exclude_values.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = FocusRule::load(Path::new("/nonexistent/focus.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

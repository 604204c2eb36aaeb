use harvest_config::{CategoryConfig, IntegrityConfig};
use harvest_core::{MetadataRecord, Problem, ProblemKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::matcher::ValueMatcher;
use crate::sorter::partition;

#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub categories_checked: usize,
    pub values_checked: usize,
    pub problems: Vec<Problem>,
}

impl IntegrityReport {
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

/// Multi-category referential integrity checker.
///
/// Never mutates the records it checks; findings are returned as problems
/// against the child record that gave each unmatched value.
#[derive(Debug, Clone)]
pub struct IntegrityChecker {
    categories: Vec<CategoryConfig>,
}

impl IntegrityChecker {
    #[must_use]
    pub fn new(config: &IntegrityConfig) -> Self {
        Self {
            categories: config.categories.clone(),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryConfig] {
        &self.categories
    }

    /// Check one category. An empty parent set reports every child value.
    #[must_use]
    pub fn check_category(records: &[MetadataRecord], category: &CategoryConfig) -> (usize, Vec<Problem>) {
        let split = partition(records, &category.name);
        let identifier = category.identifier.as_str();
        let matcher = ValueMatcher::new(&split.parents, identifier);
        let values_checked = split
            .children
            .iter()
            .map(|record| record.slot_values(identifier).count())
            .sum();

        let problems: Vec<Problem> = matcher
            .unmatched(&split.children, identifier)
            .into_iter()
            .map(|unmatched| {
                Problem::new(
                    ProblemKind::UnmatchedReference,
                    format!(
                        "{identifier} '{}' does not match any {} object.",
                        unmatched.value, category.name
                    ),
                    unmatched.record.source.as_str(),
                )
                .at_line(unmatched.line)
            })
            .collect();

        debug!(
            category = category.name.as_str(),
            parents = split.parents.len(),
            children = split.children.len(),
            parent_values = matcher.len(),
            unmatched = problems.len(),
            "checked category"
        );
        (values_checked, problems)
    }

    /// Check every configured category and merge the findings.
    #[must_use]
    pub fn check(&self, records: &[MetadataRecord]) -> IntegrityReport {
        let mut report = IntegrityReport::default();
        for category in &self.categories {
            let (values_checked, problems) = Self::check_category(records, category);
            report.categories_checked += 1;
            report.values_checked += values_checked;
            report.problems.extend(problems);
        }
        info!(
            records = records.len(),
            categories = report.categories_checked,
            unmatched = report.problems.len(),
            "referential integrity check finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::{Severity, Slot};
    use pretty_assertions::assert_eq;

    fn slot(name: &str, values: &[&str]) -> Slot {
        Slot::new(name, values.iter().map(|v| (*v).to_string()).collect()).unwrap()
    }

    fn record(source: &str, classes: &[&str], slots: Vec<Slot>) -> MetadataRecord {
        MetadataRecord {
            source: source.into(),
            identifier: None,
            title: None,
            object_type: "Product_Proxy_PDS3".into(),
            data_classes: classes.iter().map(|c| (*c).to_string()).collect(),
            references: vec![],
            slots,
        }
    }

    fn category(name: &str, identifier: &str) -> CategoryConfig {
        CategoryConfig {
            name: name.into(),
            identifier: identifier.into(),
        }
    }

    #[test]
    fn unmatched_child_values_become_errors() {
        let records = vec![
            record("targets.cat", &["TARGET"], vec![slot("TARGET_NAME", &["a", "b", "c"])]),
            record("dataset.cat", &["DATA_SET"], vec![slot("TARGET_NAME", &["a", "b", "d"])]),
        ];
        let (checked, problems) =
            IntegrityChecker::check_category(&records, &category("TARGET", "TARGET_NAME"));

        assert_eq!(checked, 3);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ProblemKind::UnmatchedReference);
        assert_eq!(problems[0].severity, Severity::Error);
        assert_eq!(problems[0].source, "dataset.cat");
        assert_eq!(
            problems[0].message,
            "TARGET_NAME 'd' does not match any TARGET object."
        );
        assert_eq!(problems[0].line, None);
    }

    #[test]
    fn unmatched_reference_points_at_the_statement_line() {
        let dataset = Slot::located("TARGET_NAME", vec![("PLUTO".to_string(), 12)]).unwrap();
        let records = vec![
            record("targets.cat", &["TARGET"], vec![slot("TARGET_NAME", &["MARS"])]),
            record("dataset.cat", &["DATA_SET"], vec![dataset]),
        ];
        let (_, problems) =
            IntegrityChecker::check_category(&records, &category("TARGET", "TARGET_NAME"));

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].line, Some(12));
        assert_eq!(problems[0].to_string(), "ERROR  line 12: TARGET_NAME 'PLUTO' does not match any TARGET object.");
    }

    #[test]
    fn empty_parent_set_fails_open_to_report() {
        let records = vec![record("dataset.cat", &["DATA_SET"], vec![slot("MISSION_NAME", &["a"])])];
        let (_, problems) =
            IntegrityChecker::check_category(&records, &category("MISSION", "MISSION_NAME"));
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn categories_are_checked_independently_and_merged() {
        let records = vec![
            record(
                "mission.cat",
                &["MISSION"],
                vec![slot("MISSION_NAME", &["MGS"]), slot("TARGET_NAME", &["MARS"])],
            ),
            record(
                "dataset.cat",
                &["DATA_SET"],
                vec![
                    slot("DATA_SET_ID", &["DS-1"]),
                    slot("MISSION_NAME", &["MGS"]),
                    slot("TARGET_NAME", &["MARS"]),
                    slot("INSTRUMENT_ID", &["MOLA"]),
                ],
            ),
        ];
        let checker = IntegrityChecker::new(&IntegrityConfig::default());
        let report = checker.check(&records);

        assert_eq!(report.categories_checked, 8);
        let messages: Vec<&str> = report.problems.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "INSTRUMENT_ID 'MOLA' does not match any INSTRUMENT object.",
                "TARGET_NAME 'MARS' does not match any TARGET object.",
            ]
        );
        assert!(report.has_problems());
    }

    #[test]
    fn consistent_batch_has_no_problems() {
        let records = vec![
            record("target.cat", &["TARGET"], vec![slot("TARGET_NAME", &["MARS"])]),
            record("mission.cat", &["MISSION"], vec![slot("TARGET_NAME", &["MARS"])]),
        ];
        let checker = IntegrityChecker::new(&IntegrityConfig {
            categories: vec![category("TARGET", "TARGET_NAME")],
        });
        let report = checker.check(&records);
        assert!(!report.has_problems());
        assert_eq!(report.values_checked, 1);
    }
}

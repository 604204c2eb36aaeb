use std::collections::BTreeSet;

use harvest_core::MetadataRecord;

/// A child value with no matching parent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unmatched<'a> {
    pub value: &'a str,
    /// First child record giving the value.
    pub record: &'a MetadataRecord,
    /// Label line of the statement giving the value, when known.
    pub line: Option<u32>,
}

/// Index of the values parents give for one identifying keyword.
///
/// Matching is exact string equality.
#[derive(Debug, Clone, Default)]
pub struct ValueMatcher<'a> {
    known: BTreeSet<&'a str>,
}

impl<'a> ValueMatcher<'a> {
    #[must_use]
    pub fn new(parents: &[&'a MetadataRecord], identifier: &'a str) -> Self {
        Self {
            known: parents
                .iter()
                .copied()
                .flat_map(|record| record.slot_values(identifier))
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.known.contains(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Child values absent from the index, each reported once.
    #[must_use]
    pub fn unmatched(&self, children: &[&'a MetadataRecord], identifier: &'a str) -> Vec<Unmatched<'a>> {
        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for &record in children {
            for (value, line) in record.slot_entries(identifier) {
                if !self.contains(value) && seen.insert(value) {
                    result.push(Unmatched { value, record, line });
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::Slot;
    use pretty_assertions::assert_eq;

    fn record(source: &str, values: &[&str]) -> MetadataRecord {
        MetadataRecord {
            source: source.into(),
            identifier: None,
            title: None,
            object_type: "Product_Proxy_PDS3".into(),
            data_classes: vec![],
            references: vec![],
            slots: Slot::new("TARGET_NAME", values.iter().map(|v| (*v).to_string()).collect())
                .into_iter()
                .collect(),
        }
    }

    fn values<'a>(unmatched: &[Unmatched<'a>]) -> Vec<&'a str> {
        unmatched.iter().map(|u| u.value).collect()
    }

    #[test]
    fn reports_values_missing_from_parents() {
        let parents = [record("a.cat", &["a", "b"]), record("c.cat", &["c"])];
        let children = [record("x.cat", &["a", "b"]), record("y.cat", &["d"])];
        let parents: Vec<&MetadataRecord> = parents.iter().collect();
        let children: Vec<&MetadataRecord> = children.iter().collect();

        let matcher = ValueMatcher::new(&parents, "TARGET_NAME");
        let unmatched = matcher.unmatched(&children, "TARGET_NAME");
        assert_eq!(values(&unmatched), vec!["d"]);
        assert_eq!(unmatched[0].record.source, "y.cat");
    }

    #[test]
    fn empty_parents_report_every_child_value() {
        let children = [record("x.cat", &["a"])];
        let children: Vec<&MetadataRecord> = children.iter().collect();

        let matcher = ValueMatcher::new(&[], "TARGET_NAME");
        assert!(matcher.is_empty());
        assert_eq!(values(&matcher.unmatched(&children, "TARGET_NAME")), vec!["a"]);
    }

    #[test]
    fn matching_is_exact_and_values_are_reported_once() {
        let parents = [record("p.cat", &["MARS"])];
        let children = [record("x.cat", &["Mars", "MARS"]), record("y.cat", &["Mars"])];
        let parents: Vec<&MetadataRecord> = parents.iter().collect();
        let children: Vec<&MetadataRecord> = children.iter().collect();

        let unmatched = ValueMatcher::new(&parents, "TARGET_NAME").unmatched(&children, "TARGET_NAME");
        assert_eq!(values(&unmatched), vec!["Mars"]);
        assert_eq!(unmatched[0].record.source, "x.cat");
    }

    #[test]
    fn unmatched_values_keep_their_statement_line() {
        let parents = [record("p.cat", &["MARS"])];
        let mut child = record("x.cat", &[]);
        child.slots = Slot::located(
            "TARGET_NAME",
            vec![("MARS".to_string(), 3), ("VENUS".to_string(), 7)],
        )
        .into_iter()
        .collect();
        let parents: Vec<&MetadataRecord> = parents.iter().collect();

        let unmatched = ValueMatcher::new(&parents, "TARGET_NAME").unmatched(&[&child], "TARGET_NAME");
        assert_eq!(values(&unmatched), vec!["VENUS"]);
        assert_eq!(unmatched[0].line, Some(7));
    }
}

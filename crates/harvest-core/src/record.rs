//! The metadata record produced once per admitted label.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::Identifier;

/// Field names the record answers to directly; anything else is looked up
/// among the slots.
pub const LOGICAL_ID: &str = "logical_identifier";
pub const PRODUCT_VERSION: &str = "version_id";
pub const OBJECT_TYPE: &str = "object_type";
pub const TITLE: &str = "title";

/// One typed association from the record's product to another product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceEntry {
    pub target: Identifier,
    pub relationship: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// A named, possibly multi-valued, optionally unit-tagged attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Slot {
    pub name: String,
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Label line of each value, parallel to `values`. Empty when unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<u32>,
}

impl Slot {
    /// Build a slot, or `None` when there are no values.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            values,
            unit: None,
            lines: Vec::new(),
        })
    }

    /// Build a slot from values paired with the line each was read from.
    pub fn located(name: impl Into<String>, entries: Vec<(String, u32)>) -> Option<Self> {
        let (values, lines): (Vec<String>, Vec<u32>) = entries.into_iter().unzip();
        let mut slot = Self::new(name, values)?;
        slot.lines = lines;
        Some(slot)
    }

    #[must_use]
    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    /// Each value with its line, when known.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<u32>)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (value.as_str(), self.lines.get(index).copied()))
    }
}

/// Structured metadata extracted from one label.
///
/// Immutable once produced: downstream consumers and the integrity checker
/// only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MetadataRecord {
    /// Path of the label the record was extracted from.
    pub source: String,
    pub identifier: Option<Identifier>,
    pub title: Option<String>,
    pub object_type: String,
    #[serde(default)]
    pub data_classes: Vec<String>,
    #[serde(default)]
    pub references: Vec<ReferenceEntry>,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl MetadataRecord {
    /// First slot with the given name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// All values of every slot with the given name, in record order.
    pub fn slot_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.slot_entries(name).map(|(value, _)| value)
    }

    /// Like [`MetadataRecord::slot_values`], with the line of each value.
    pub fn slot_entries<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, Option<u32>)> + 'a {
        self.slots
            .iter()
            .filter(move |slot| slot.name == name)
            .flat_map(Slot::entries)
    }

    /// Whether the named field carries a non-empty value.
    ///
    /// The core field names map onto the record's own fields; any other
    /// name is answered from the slots.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        match name {
            LOGICAL_ID => self.identifier.as_ref().is_some_and(|id| !id.lid.is_empty()),
            PRODUCT_VERSION => self
                .identifier
                .as_ref()
                .is_some_and(|id| id.version.as_deref().is_some_and(|v| !v.is_empty())),
            OBJECT_TYPE => !self.object_type.is_empty(),
            TITLE => self.title.as_deref().is_some_and(|t| !t.is_empty()),
            other => self.slot(other).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> MetadataRecord {
        MetadataRecord {
            source: "bundle.xml".into(),
            identifier: Some(Identifier::versioned("urn:nasa:pds:mer", "1.0")),
            title: Some("Mars Exploration Rover".into()),
            object_type: "Product_Bundle".into(),
            data_classes: vec![],
            references: vec![
                ReferenceEntry {
                    target: Identifier::new("urn:nasa:pds:mer:a"),
                    relationship: "bundle_has_member_collection".into(),
                    source: "bundle.xml".into(),
                    line: Some(10),
                },
                ReferenceEntry {
                    target: Identifier::new("urn:nasa:pds:context:mer"),
                    relationship: "bundle_to_investigation".into(),
                    source: "bundle.xml".into(),
                    line: Some(20),
                },
                ReferenceEntry {
                    target: Identifier::new("urn:nasa:pds:mer:b"),
                    relationship: "bundle_has_member_collection".into(),
                    source: "bundle.xml".into(),
                    line: Some(14),
                },
            ],
            slots: vec![Slot::new("bundle_type", vec!["Archive".into()]).unwrap()],
        }
    }

    #[test]
    fn empty_slot_is_never_built() {
        assert!(Slot::new("start_time", vec![]).is_none());
    }

    #[test]
    fn core_fields_answer_from_record() {
        let r = record();
        assert!(r.has_field(LOGICAL_ID));
        assert!(r.has_field(PRODUCT_VERSION));
        assert!(r.has_field(OBJECT_TYPE));
        assert!(r.has_field(TITLE));
        assert!(r.has_field("bundle_type"));
        assert!(!r.has_field("start_time"));
    }

    #[test]
    fn located_slots_pair_values_with_lines() {
        let mut r = record();
        r.slots.push(
            Slot::located(
                "TARGET_NAME",
                vec![("MARS".into(), 4), ("PHOBOS".into(), 9)],
            )
            .unwrap(),
        );
        r.slots.push(Slot::new("TARGET_NAME", vec!["DEIMOS".into()]).unwrap());

        let entries: Vec<(&str, Option<u32>)> = r.slot_entries("TARGET_NAME").collect();
        assert_eq!(
            entries,
            vec![("MARS", Some(4)), ("PHOBOS", Some(9)), ("DEIMOS", None)]
        );
        assert_eq!(
            r.slot_values("TARGET_NAME").collect::<Vec<_>>(),
            vec!["MARS", "PHOBOS", "DEIMOS"]
        );
        assert!(Slot::located("TARGET_NAME", vec![]).is_none());
    }

    #[test]
    fn serialization_is_stable() {
        let r = record();
        let first = serde_json::to_string(&r).unwrap();
        let second = serde_json::to_string(&r.clone()).unwrap();
        assert_eq!(first, second);
        let back: MetadataRecord = serde_json::from_str(&first).unwrap();
        assert_eq!(back, r);
    }
}

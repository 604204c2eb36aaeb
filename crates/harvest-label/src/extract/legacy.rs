//! Extraction from legacy keyword labels and catalog files.
//!
//! Identity is synthesized from configured keywords; every top-level
//! `OBJECT` is a data class.

use harvest_core::{Identifier, MetadataRecord, ReferenceEntry, Slot};
use tracing::debug;

use super::{Extraction, MetadataExtractor, normalize_whitespace, push_unique, rule_slot};
use crate::odl::BLOCK_KIND;
use crate::policy::Policy;
use crate::tree::{LabelTree, NodeRef};

#[derive(Debug, Clone, Copy)]
pub struct LegacyExtractor<'p> {
    policy: &'p Policy,
}

impl<'p> LegacyExtractor<'p> {
    #[must_use]
    pub const fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }
}

/// Every statement named `keyword`, anywhere in the label.
fn statements<'a>(tree: &'a LabelTree, keyword: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
    tree.iter()
        .filter(move |node| node.name() == keyword && node.attribute(BLOCK_KIND).is_none())
}

/// Non-empty values of `keyword` with the line of each statement.
fn keyword_entries(tree: &LabelTree, keyword: &str) -> Vec<(String, u32)> {
    statements(tree, keyword)
        .filter(|node| !node.value().is_empty())
        .map(|node| (node.value().to_string(), node.line()))
        .collect()
}

fn keyword_values(tree: &LabelTree, keyword: &str) -> Vec<String> {
    keyword_entries(tree, keyword)
        .into_iter()
        .map(|(value, _)| value)
        .collect()
}

fn data_classes(tree: &LabelTree) -> Vec<String> {
    let mut classes = Vec::new();
    for node in tree
        .root()
        .children()
        .filter(|node| node.attribute(BLOCK_KIND) == Some("OBJECT"))
    {
        push_unique(&mut classes, node.name());
    }
    classes
}

impl LegacyExtractor<'_> {
    fn slots(&self, tree: &LabelTree) -> Vec<Slot> {
        let legacy = self.policy.legacy();
        let mut slots: Vec<Slot> = self
            .policy
            .rules_for(&legacy.object_type)
            .iter()
            .filter_map(|rule| rule_slot(rule, tree))
            .collect();

        for keyword in &legacy.slot_keywords {
            if slots.iter().any(|slot| &slot.name == keyword) {
                continue;
            }
            slots.extend(Slot::located(keyword.clone(), keyword_entries(tree, keyword)));
        }
        slots
    }

    fn references(&self, tree: &LabelTree, source: &str) -> Vec<ReferenceEntry> {
        let mut entries = Vec::new();
        for (keyword, relationship) in &self.policy.legacy().reference_keywords {
            for node in statements(tree, keyword) {
                let value = node.value();
                if value.is_empty() {
                    continue;
                }
                entries.push(ReferenceEntry {
                    target: Identifier::new(value),
                    relationship: relationship.clone(),
                    source: source.to_string(),
                    line: Some(node.line()),
                });
            }
        }
        entries.sort_by_key(|entry| entry.line);
        entries
    }
}

impl MetadataExtractor for LegacyExtractor<'_> {
    fn identifier(&self, tree: &LabelTree) -> Option<Identifier> {
        let legacy = self.policy.legacy();
        let parts: Vec<String> = legacy
            .lid_keywords
            .iter()
            .filter_map(|keyword| keyword_values(tree, keyword).into_iter().next())
            .map(|value| value.to_ascii_lowercase())
            .collect();
        if parts.is_empty() {
            return None;
        }
        let lid = format!("{}{}", legacy.lid_prefix, parts.join(":"));
        Some(Identifier::versioned(lid, legacy.version.clone()))
    }

    fn object_type(&self, _tree: &LabelTree) -> String {
        self.policy.legacy().object_type.clone()
    }

    fn extract(&self, tree: &LabelTree, source: &str) -> Extraction {
        let legacy = self.policy.legacy();
        let title = keyword_values(tree, &legacy.title_keyword)
            .first()
            .map(|title| normalize_whitespace(title))
            .filter(|title| !title.is_empty());

        let record = MetadataRecord {
            source: source.to_string(),
            identifier: self.identifier(tree),
            title,
            object_type: self.object_type(tree),
            data_classes: data_classes(tree),
            references: self.references(tree, source),
            slots: self.slots(tree),
        };
        debug!(
            source,
            data_classes = record.data_classes.len(),
            slots = record.slots.len(),
            "extracted legacy metadata"
        );
        Extraction {
            record,
            problems: Vec::new(),
        }
    }
}

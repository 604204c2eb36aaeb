//! Metadata extraction: one contract, one strategy per label dialect.
//!
//! [`ExtractorKind::classify`] picks the variant once per label; the
//! returned [`Extractor`] delegates to the matching strategy. Extraction never
//! fails: missing fields leave the record incomplete and per-entry problems
//! come back alongside it.

mod files;
mod legacy;
mod modern;

pub use files::{DeclaredFile, declared_files};
pub use legacy::LegacyExtractor;
pub use modern::ModernExtractor;

use harvest_core::{Identifier, MetadataRecord, Problem, Slot};

use crate::parser::Dialect;
use crate::policy::{Policy, Rule};
use crate::tree::LabelTree;

/// Object type of bundle labels.
pub const BUNDLE: &str = "Product_Bundle";
/// Object type of collection labels.
pub const COLLECTION: &str = "Product_Collection";

/// A record plus the per-entry problems found while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: MetadataRecord,
    pub problems: Vec<Problem>,
}

/// Shared extraction contract.
pub trait MetadataExtractor {
    /// The label's own identity, when it declares one.
    fn identifier(&self, tree: &LabelTree) -> Option<Identifier>;

    /// The declared object type, or `""`.
    fn object_type(&self, tree: &LabelTree) -> String;

    /// Build the metadata record for `tree`, read from `source`.
    fn extract(&self, tree: &LabelTree, source: &str) -> Extraction;
}

/// Which extraction variant handles a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Bundle,
    Collection,
    Generic,
    Legacy,
}

impl ExtractorKind {
    #[must_use]
    pub fn classify(dialect: Dialect, object_type: &str) -> Self {
        match dialect {
            Dialect::Legacy => Self::Legacy,
            Dialect::Modern => match object_type {
                BUNDLE => Self::Bundle,
                COLLECTION => Self::Collection,
                _ => Self::Generic,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Collection => "collection",
            Self::Generic => "generic",
            Self::Legacy => "legacy",
        }
    }
}

/// The extractor selected for one label.
#[derive(Debug, Clone, Copy)]
pub enum Extractor<'p> {
    Modern(ModernExtractor<'p>),
    Legacy(LegacyExtractor<'p>),
}

impl<'p> Extractor<'p> {
    /// Classify `tree` and return the extractor for it.
    #[must_use]
    pub fn for_label(tree: &LabelTree, policy: &'p Policy) -> Self {
        match tree.dialect() {
            Dialect::Legacy => Self::Legacy(LegacyExtractor::new(policy)),
            Dialect::Modern => {
                let object_type = ModernExtractor::declared_object_type(tree, policy);
                let kind = ExtractorKind::classify(Dialect::Modern, &object_type);
                Self::Modern(ModernExtractor::new(policy, kind))
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ExtractorKind {
        match self {
            Self::Modern(extractor) => extractor.kind(),
            Self::Legacy(_) => ExtractorKind::Legacy,
        }
    }
}

impl MetadataExtractor for Extractor<'_> {
    fn identifier(&self, tree: &LabelTree) -> Option<Identifier> {
        match self {
            Self::Modern(extractor) => extractor.identifier(tree),
            Self::Legacy(extractor) => extractor.identifier(tree),
        }
    }

    fn object_type(&self, tree: &LabelTree) -> String {
        match self {
            Self::Modern(extractor) => extractor.object_type(tree),
            Self::Legacy(extractor) => extractor.object_type(tree),
        }
    }

    fn extract(&self, tree: &LabelTree, source: &str) -> Extraction {
        match self {
            Self::Modern(extractor) => extractor.extract(tree, source),
            Self::Legacy(extractor) => extractor.extract(tree, source),
        }
    }
}

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Evaluate one slot rule against `tree`.
///
/// The slot is named after the rule, or after the first matched element when
/// the rule gives no name. Matches without a value are dropped; a rule left
/// with no values yields no slot.
fn rule_slot(rule: &Rule, tree: &LabelTree) -> Option<Slot> {
    let matches = rule.path.select_in(tree);
    let first = matches.first()?;
    let name = rule.name.clone().unwrap_or_else(|| first.name().to_string());
    let unit = rule
        .unit_attribute
        .as_deref()
        .and_then(|attribute| first.attribute(attribute))
        .map(str::to_string);
    let entries = matches
        .iter()
        .filter(|node| !node.value().is_empty())
        .map(|node| (node.value().to_string(), node.line()))
        .collect();
    Slot::located(name, entries).map(|slot| slot.with_unit(unit))
}

/// Append `name` unless it is already present.
fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Mars  \n Exploration   Rover", "Mars Exploration Rover")]
    #[case("  padded\t", "padded")]
    #[case("", "")]
    fn normalizes_titles(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[rstest]
    #[case(Dialect::Modern, "Product_Bundle", ExtractorKind::Bundle)]
    #[case(Dialect::Modern, "Product_Collection", ExtractorKind::Collection)]
    #[case(Dialect::Modern, "Product_Observational", ExtractorKind::Generic)]
    #[case(Dialect::Modern, "", ExtractorKind::Generic)]
    #[case(Dialect::Legacy, "Product_Bundle", ExtractorKind::Legacy)]
    fn classifies_extractors(
        #[case] dialect: Dialect,
        #[case] object_type: &str,
        #[case] expected: ExtractorKind,
    ) {
        assert_eq!(ExtractorKind::classify(dialect, object_type), expected);
    }
}

//! Extraction from modern (XML) labels.

use harvest_core::{Identifier, MetadataRecord, Problem, ProblemKind, ReferenceEntry, Slot};
use tracing::{debug, error, warn};

use super::{Extraction, ExtractorKind, MetadataExtractor, normalize_whitespace, push_unique, rule_slot};
use crate::policy::{Policy, TypeMapping};
use crate::tree::{LabelTree, NodeRef};

const LIDVID_REFERENCE: &str = "lidvid_reference";
const LID_REFERENCE: &str = "lid_reference";
const REFERENCE_TYPE: &str = "reference_type";

const BUNDLE_TYPE: &str = "bundle_type";
const COLLECTION_TYPE: &str = "collection_type";
const PAGE_TYPE: &str = "page_type";

/// Children of `Product_Context` that are not data classes.
const CONTEXT_NON_CLASSES: [&str; 3] = ["Identification_Area", "Reference_List", "Discipline_Area"];

#[derive(Debug, Clone, Copy)]
pub struct ModernExtractor<'p> {
    policy: &'p Policy,
    kind: ExtractorKind,
}

impl<'p> ModernExtractor<'p> {
    #[must_use]
    pub const fn new(policy: &'p Policy, kind: ExtractorKind) -> Self {
        Self { policy, kind }
    }

    #[must_use]
    pub const fn kind(&self) -> ExtractorKind {
        self.kind
    }

    pub(crate) fn declared_object_type(tree: &LabelTree, policy: &Policy) -> String {
        policy
            .core
            .product_class
            .first_value(tree.root())
            .unwrap_or_default()
            .to_string()
    }

    fn title(&self, tree: &LabelTree) -> Option<String> {
        self.policy
            .core
            .title
            .first_value(tree.root())
            .map(normalize_whitespace)
            .filter(|title| !title.is_empty())
    }

    fn slots(&self, tree: &LabelTree, object_type: &str) -> Vec<Slot> {
        let mut slots = Vec::new();
        if self.policy.recognizes(object_type) {
            slots.extend(
                self.policy
                    .rules_for(object_type)
                    .iter()
                    .filter_map(|rule| rule_slot(rule, tree)),
            );
        }

        let root = tree.root();
        match self.kind {
            ExtractorKind::Bundle => {
                slots.extend(Slot::new(BUNDLE_TYPE, self.policy.core.bundle_type.values(root)));
            }
            ExtractorKind::Collection => {
                let collection_type = self.policy.core.collection_type.values(root);
                let page_type = if collection_type.iter().any(|t| t == "Document") {
                    "Resource"
                } else {
                    "Data"
                };
                slots.extend(Slot::new(COLLECTION_TYPE, collection_type));
                slots.extend(Slot::new(PAGE_TYPE, vec![page_type.to_string()]));
            }
            ExtractorKind::Generic | ExtractorKind::Legacy => {}
        }
        slots
    }

    fn references(&self, tree: &LabelTree, source: &str) -> (Vec<ReferenceEntry>, Vec<Problem>) {
        let mut entries = Vec::new();
        let mut problems = Vec::new();
        for element in self.policy.core.references.select_in(tree) {
            self.read_association(element, source, &mut entries, &mut problems);
        }
        (entries, problems)
    }

    /// Read one association element, fanning out one entry per target.
    fn read_association(
        &self,
        element: NodeRef<'_>,
        source: &str,
        entries: &mut Vec<ReferenceEntry>,
        problems: &mut Vec<Problem>,
    ) {
        let mut targets = Vec::new();
        let mut relationship: Option<String> = None;
        let mut malformed = false;

        for child in element.children() {
            let value = child.value();
            match child.name() {
                LIDVID_REFERENCE => match Identifier::parse_versioned(value) {
                    Ok(id) => targets.push(id),
                    Err(_) => {
                        malformed = true;
                        let message = format!("Expected a LID-VID reference, but found this: {value}");
                        error!(source, line = child.line(), "{message}");
                        problems.push(
                            Problem::new(ProblemKind::MalformedReference, message, source)
                                .at(child.line(), child.column()),
                        );
                    }
                },
                LID_REFERENCE => {
                    if value.is_empty() {
                        malformed = true;
                        let message = "Found an empty 'lid_reference' element.";
                        error!(source, line = child.line(), "{message}");
                        problems.push(
                            Problem::new(ProblemKind::MalformedReference, message, source)
                                .at(child.line(), child.column()),
                        );
                    } else {
                        targets.push(Identifier::new(value));
                    }
                }
                REFERENCE_TYPE if !value.is_empty() => {
                    relationship = Some(self.remap(value, child, source, problems));
                }
                _ => {}
            }
        }

        if targets.is_empty() {
            if !malformed {
                let message = "Missing one or more 'lidvid_reference' or 'lid_reference' elements.";
                error!(source, line = element.line(), "{message}");
                problems.push(
                    Problem::new(ProblemKind::MissingReferenceTarget, message, source)
                        .at(element.line(), element.column()),
                );
            }
            return;
        }

        let Some(relationship) = relationship else {
            let message = format!("Could not find '{REFERENCE_TYPE}' element.");
            error!(source, line = element.line(), "{message}");
            problems.push(
                Problem::new(ProblemKind::MissingReferenceType, message, source)
                    .at(element.line(), element.column()),
            );
            return;
        };

        entries.extend(targets.into_iter().map(|target| ReferenceEntry {
            target,
            relationship: relationship.clone(),
            source: source.to_string(),
            line: Some(element.line()),
        }));
    }

    fn remap(
        &self,
        declared: &str,
        node: NodeRef<'_>,
        source: &str,
        problems: &mut Vec<Problem>,
    ) -> String {
        match self.policy.map_reference_type(declared) {
            TypeMapping::Unconfigured => declared.to_string(),
            TypeMapping::Mapped(mapped) => {
                debug!(source, line = node.line(), "Mapping reference type '{declared}' to '{mapped}'.");
                mapped.to_string()
            }
            TypeMapping::Unmapped => {
                let message = format!("No mapping found for reference type '{declared}'.");
                warn!(source, line = node.line(), "{message}");
                problems.push(
                    Problem::new(ProblemKind::UnmappedReferenceType, message, source)
                        .at(node.line(), node.column()),
                );
                declared.to_string()
            }
        }
    }
}

/// Element names under `File_Area_Observational` (except `File`) and under a
/// `Product_Context` root (except its bookkeeping areas), first-seen order.
fn data_classes(tree: &LabelTree) -> Vec<String> {
    let mut classes = Vec::new();
    for area in tree.iter().filter(|node| node.name() == "File_Area_Observational") {
        for child in area.children().filter(|child| child.name() != "File") {
            push_unique(&mut classes, child.name());
        }
    }
    let root = tree.root();
    if root.name() == "Product_Context" {
        for child in root
            .children()
            .filter(|child| !CONTEXT_NON_CLASSES.contains(&child.name()))
        {
            push_unique(&mut classes, child.name());
        }
    }
    classes
}

impl MetadataExtractor for ModernExtractor<'_> {
    fn identifier(&self, tree: &LabelTree) -> Option<Identifier> {
        let root = tree.root();
        let lid = self.policy.core.logical_identifier.first_value(root)?;
        Some(match self.policy.core.version_id.first_value(root) {
            Some(version) => Identifier::versioned(lid, version),
            None => Identifier::new(lid),
        })
    }

    fn object_type(&self, tree: &LabelTree) -> String {
        Self::declared_object_type(tree, self.policy)
    }

    fn extract(&self, tree: &LabelTree, source: &str) -> Extraction {
        let object_type = self.object_type(tree);
        let (references, problems) = self.references(tree, source);
        let record = MetadataRecord {
            source: source.to_string(),
            identifier: self.identifier(tree),
            title: self.title(tree),
            slots: self.slots(tree, &object_type),
            object_type,
            data_classes: data_classes(tree),
            references,
        };
        debug!(
            source,
            kind = self.kind.as_str(),
            references = record.references.len(),
            slots = record.slots.len(),
            "extracted metadata"
        );
        Extraction { record, problems }
    }
}

//! Product checks run on a label and its record before ingestion.

use harvest_core::{MetadataRecord, Problem, ProblemKind};
use tracing::info;

use crate::parser::Dialect;
use crate::policy::Policy;
use crate::tree::LabelTree;

/// Longest title accepted without a warning, in characters.
pub const TITLE_MAX_LENGTH: usize = 255;

/// Characters a URN may not contain.
const URN_ILLEGAL_CHARACTERS: &[char] = &[
    '%', '/', '\\', '?', '#', '"', '&', '<', '>', '[', ']', '^', '`', '{', '|', '}', '~',
];

/// Suffixes a logical identifier may not end with.
const ILLEGAL_LID_SUFFIXES: [&str; 2] = [".xml", ".json"];

const LEGACY_VERSION_KEYWORD: &str = "PDS_VERSION_ID";
const SFDU_VALUE: &str = "SFDU_LABEL";

/// Structural validity of a parsed label.
///
/// Modern labels need a `Product_*` root with an identification area; legacy
/// labels must open with `PDS_VERSION_ID`, optionally preceded by an SFDU
/// header statement.
#[must_use]
pub fn structural_problem(tree: &LabelTree, policy: &Policy, source: &str) -> Option<Problem> {
    let root = tree.root();
    let message = match tree.dialect() {
        Dialect::Modern => {
            if !root.name().starts_with("Product_") {
                format!("Root element '{}' is not a product.", root.name())
            } else if policy.core.identification_area.first(root).is_none() {
                "Missing 'Identification_Area' element.".to_string()
            } else {
                return None;
            }
        }
        Dialect::Legacy => {
            let first = root.children().find(|node| node.value() != SFDU_VALUE);
            match first {
                Some(node) if node.name() == LEGACY_VERSION_KEYWORD => return None,
                Some(node) => format!(
                    "Expected '{LEGACY_VERSION_KEYWORD}' as the first statement, found '{}'.",
                    node.name()
                ),
                None => "Label has no statements.".to_string(),
            }
        }
    };
    Some(
        Problem::new(ProblemKind::InvalidLabel, message, source)
            .at(root.line(), root.column()),
    )
}

/// Findings on an extracted record.
#[must_use]
pub fn check_record(record: &MetadataRecord, policy: &Policy) -> Vec<Problem> {
    let source = record.source.as_str();
    let mut problems = Vec::new();

    for field in policy.required_fields(&record.object_type) {
        if !record.has_field(field) {
            problems.push(Problem::new(
                ProblemKind::MissingRequiredField,
                format!("Missing required field '{field}'."),
                source,
            ));
        }
    }

    if let Some(identifier) = &record.identifier {
        let lid = identifier.lid.as_str();
        if let Some(c) = lid.chars().find(|c| URN_ILLEGAL_CHARACTERS.contains(c)) {
            problems.push(Problem::new(
                ProblemKind::IllegalIdentifier,
                format!("Logical identifier '{lid}' contains the illegal character '{c}'."),
                source,
            ));
        }
        let lower = lid.to_ascii_lowercase();
        if let Some(suffix) = ILLEGAL_LID_SUFFIXES.iter().find(|s| lower.ends_with(*s)) {
            problems.push(Problem::new(
                ProblemKind::IllegalIdentifier,
                format!("Logical identifier '{lid}' ends with '{suffix}'."),
                source,
            ));
        }
    }

    if let Some(title) = &record.title {
        let length = title.chars().count();
        if length > TITLE_MAX_LENGTH {
            problems.push(Problem::new(
                ProblemKind::TitleTooLong,
                format!("Title is {length} characters long; the limit is {TITLE_MAX_LENGTH}."),
                source,
            ));
        }
    }

    if record.references.is_empty() {
        info!(source, "No associations found.");
        problems.push(Problem::new(
            ProblemKind::NoAssociations,
            "No associations found.",
            source,
        ));
    }

    problems
}

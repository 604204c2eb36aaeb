//! Label readers and dialect detection from file extensions.

use std::path::Path;

use crate::error::LabelError;
use crate::odl;
use crate::tree::{LabelTree, NodeData, NodeId};

/// Label grammar family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Hierarchical XML labels.
    Modern,
    /// Fixed-keyword ODL labels and catalog files.
    Legacy,
}

impl Dialect {
    /// Detect the dialect from a file extension, case-insensitively.
    ///
    /// Returns `None` for unrecognized extensions.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(Self::Modern),
            "lbl" | "cat" | "txt" => Some(Self::Legacy),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
        }
    }

    #[must_use]
    pub fn parser(self) -> &'static dyn LabelParser {
        match self {
            Self::Modern => &ModernParser,
            Self::Legacy => &LegacyParser,
        }
    }
}

/// Turns label text into a [`LabelTree`].
pub trait LabelParser: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// # Errors
    /// Returns [`LabelError::ParseFailed`] with the offending line.
    fn parse(&self, text: &str) -> Result<LabelTree, LabelError>;
}

/// Read and parse a label file, picking the dialect from its extension.
///
/// # Errors
/// Returns [`LabelError`] for unknown extensions, unreadable files, and
/// parse failures.
pub fn parse_file(path: &Path) -> Result<LabelTree, LabelError> {
    let dialect = Dialect::from_path(path)
        .ok_or_else(|| LabelError::UnsupportedDialect(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    dialect.parser().parse(&text)
}

// ---------------------------------------------------------------------------
// Modern (XML)
// ---------------------------------------------------------------------------

/// XML label reader backed by `roxmltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernParser;

impl LabelParser for ModernParser {
    fn dialect(&self) -> Dialect {
        Dialect::Modern
    }

    fn parse(&self, text: &str) -> Result<LabelTree, LabelError> {
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            let pos = e.pos();
            LabelError::parse(pos.row, e.to_string())
        })?;

        let root = doc.root_element();
        let mut tree = LabelTree::with_root(Dialect::Modern, element_data(&doc, root));
        let root_id = tree.root().id();
        append_children(&doc, root, &mut tree, root_id);
        Ok(tree)
    }
}

fn element_data(doc: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> NodeData {
    let pos = doc.text_pos_at(node.range().start);
    let mut data = NodeData::new(node.tag_name().name(), pos.row, pos.col);
    data.namespace = node.tag_name().namespace().map(str::to_string);
    data.attributes = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    let text: String = node
        .children()
        .filter(roxmltree::Node::is_text)
        .filter_map(|child| child.text())
        .collect();
    if !text.is_empty() {
        data.text = Some(text);
    }
    data
}

fn append_children(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    tree: &mut LabelTree,
    parent: NodeId,
) {
    for child in node.children().filter(roxmltree::Node::is_element) {
        let id = tree.append(parent, element_data(doc, child));
        append_children(doc, child, tree, id);
    }
}

// ---------------------------------------------------------------------------
// Legacy (ODL)
// ---------------------------------------------------------------------------

/// Fixed-keyword label reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyParser;

impl LabelParser for LegacyParser {
    fn dialect(&self) -> Dialect {
        Dialect::Legacy
    }

    fn parse(&self, text: &str) -> Result<LabelTree, LabelError> {
        odl::parse(text)
    }
}

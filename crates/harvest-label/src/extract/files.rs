//! File objects a modern label declares.

use crate::policy::Policy;
use crate::tree::LabelTree;

/// A data file named by a label, with the checksum it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredFile {
    pub file_name: String,
    pub md5_checksum: Option<String>,
    pub line: u32,
    pub column: u32,
}

/// `File` objects under any `File_Area*` plus every `Document_File`.
///
/// Entries without a `file_name` are skipped.
#[must_use]
pub fn declared_files(tree: &LabelTree, policy: &Policy) -> Vec<DeclaredFile> {
    policy
        .core
        .file_objects
        .select_in(tree)
        .into_iter()
        .filter_map(|node| {
            let file_name = node.child_value("file_name").filter(|name| !name.is_empty())?;
            Some(DeclaredFile {
                file_name: file_name.to_string(),
                md5_checksum: node
                    .child_value("md5_checksum")
                    .filter(|sum| !sum.is_empty())
                    .map(str::to_ascii_lowercase),
                line: node.line(),
                column: node.column(),
            })
        })
        .collect()
}

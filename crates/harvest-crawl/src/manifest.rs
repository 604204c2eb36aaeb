//! Checksum manifests and comparison with label-declared checksums.
//!
//! A manifest holds one `<checksum> <path>` entry per line, the two tokens
//! separated by one or two whitespace characters. Relative paths resolve
//! against a base directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use harvest_core::{Problem, ProblemKind};
use harvest_label::extract::DeclaredFile;
use tracing::debug;

use crate::error::ManifestError;
use crate::normalize_path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<PathBuf, String>,
}

impl ChecksumManifest {
    /// # Errors
    /// Returns [`ManifestError::Io`] when the file cannot be read and
    /// [`ManifestError::MissingPath`] for the first line without a path.
    pub fn read(path: &Path, base: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&text, base)?;
        debug!(manifest = %path.display(), entries = manifest.len(), "read checksum manifest");
        Ok(manifest)
    }

    /// Parse manifest text. Lines are trimmed and blank lines are ignored.
    ///
    /// # Errors
    /// Returns [`ManifestError::MissingPath`] for the first line without a path.
    pub fn parse(text: &str, base: &Path) -> Result<Self, ManifestError> {
        let mut entries = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (checksum, file) = split_entry(line).ok_or_else(|| ManifestError::MissingPath {
                line: index + 1,
                content: line.to_string(),
            })?;
            let file = Path::new(file);
            let resolved = if file.is_absolute() {
                file.to_path_buf()
            } else {
                base.join(file)
            };
            entries.insert(normalize_path(&resolved), checksum.to_ascii_lowercase());
        }
        Ok(Self { entries })
    }

    /// Checksum listed for `path`, lowercased.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(&normalize_path(path)).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().map(|(path, sum)| (path.as_path(), sum.as_str()))
    }

    /// Compare the checksums a label declares with this manifest.
    ///
    /// File names resolve against the label's directory. Files declaring no
    /// checksum are not compared.
    #[must_use]
    pub fn verify(&self, label: &Path, files: &[DeclaredFile]) -> Vec<Problem> {
        let source = label.display().to_string();
        let directory = label.parent().unwrap_or_else(|| Path::new(""));
        let mut problems = Vec::new();
        for file in files {
            let Some(declared) = &file.md5_checksum else {
                continue;
            };
            let resolved = directory.join(&file.file_name);
            match self.get(&resolved) {
                None => problems.push(
                    Problem::new(
                        ProblemKind::ChecksumNotListed,
                        format!(
                            "No checksum found in the manifest for file '{}'.",
                            file.file_name
                        ),
                        source.as_str(),
                    )
                    .at(file.line, file.column),
                ),
                Some(listed) if listed != declared => problems.push(
                    Problem::new(
                        ProblemKind::ChecksumMismatch,
                        format!(
                            "Checksum in the label ({declared}) does not match the manifest ({listed}) for file '{}'.",
                            file.file_name
                        ),
                        source.as_str(),
                    )
                    .at(file.line, file.column),
                ),
                Some(_) => {}
            }
        }
        problems
    }
}

/// Split a line at its first run of one or two whitespace characters.
///
/// Whitespace beyond the second character belongs to the path.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let start = line.find(char::is_whitespace)?;
    let mut rest = &line[start..];
    for _ in 0..2 {
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => rest = &rest[c.len_utf8()..],
            _ => break,
        }
    }
    let checksum = &line[..start];
    (!checksum.is_empty() && !rest.is_empty()).then_some((checksum, rest))
}

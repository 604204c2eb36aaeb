//! Modification-time checkpoint for incremental crawls.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrawlError;
use crate::normalize_path;

/// Whether a file changed since the checkpoint last saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Unchanged,
    Changed,
}

/// Last-seen modification time per file path.
///
/// Paths are keyed by their absolute normalized form. Stored as JSON: an object mapping each path to an RFC 3339 timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlCheckpoint {
    entries: BTreeMap<PathBuf, DateTime<Utc>>,
}

impl CrawlCheckpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `modified` against the stored time and record it when different.
    pub fn observe(&mut self, path: &Path, modified: SystemTime) -> Freshness {
        let modified = DateTime::<Utc>::from(modified);
        let key = normalize_path(path);
        if self.entries.get(&key) == Some(&modified) {
            return Freshness::Unchanged;
        }
        self.entries.insert(key, modified);
        Freshness::Changed
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<DateTime<Utc>> {
        self.entries.get(&normalize_path(path)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a saved checkpoint. A missing file yields an empty checkpoint.
    ///
    /// # Errors
    /// Returns [`CrawlError::Io`] when the file cannot be read and
    /// [`CrawlError::Checkpoint`] when it is not a valid checkpoint.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(CrawlError::io(path, err)),
        };
        serde_json::from_str(&text).map_err(|source| CrawlError::Checkpoint {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    /// Returns [`CrawlError::Io`] when the file or its parent directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CrawlError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| CrawlError::io(parent, err))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| CrawlError::Checkpoint {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|err| CrawlError::io(path, err))
    }
}

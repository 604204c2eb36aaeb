//! Crawl targets, filters and checkpoint persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Wildcard filter applied to file names.
///
/// When `include` is non-empty it wins and `exclude` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileFilterConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Wildcard filter applied to directory names while descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryFilterConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Directories holding modern (hierarchical) labels.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Directories holding legacy (fixed-keyword) labels and catalogs.
    #[serde(default)]
    pub legacy_roots: Vec<PathBuf>,

    /// Collection labels whose inventories are read before crawling.
    #[serde(default)]
    pub collections: Vec<PathBuf>,

    #[serde(default)]
    pub file_filter: FileFilterConfig,

    #[serde(default)]
    pub directory_filter: DirectoryFilterConfig,

    /// Skip files whose modification time is unchanged since the last cycle.
    #[serde(default)]
    pub persist: bool,

    /// Where the modification-time checkpoint is saved between runs.
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
}

impl CrawlConfig {
    /// Whether there is anything to crawl.
    pub fn has_targets(&self) -> bool {
        !self.roots.is_empty() || !self.legacy_roots.is_empty() || !self.collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_targets() {
        let config = CrawlConfig::default();
        assert!(!config.has_targets());
        assert!(!config.persist);
        assert!(config.file_filter.include.is_empty());
        assert!(config.checkpoint_path.is_none());
    }
}

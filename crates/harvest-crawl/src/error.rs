use std::path::PathBuf;

use harvest_label::LabelError;

/// Errors that stop a crawl or its setup.
///
/// Per-file failures are not errors: admission turns them into outcomes.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Invalid wildcard '{pattern}': {source}")]
    Wildcard {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Crawl root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed checkpoint {}: {source}", path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read collection label {}: {source}", path.display())]
    CollectionLabel {
        path: PathBuf,
        #[source]
        source: LabelError,
    },

    #[error("Collection label {} has no {what}", path.display())]
    Inventory { path: PathBuf, what: String },

    #[error("Record output failed: {0}")]
    Sink(#[source] std::io::Error),
}

impl CrawlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn inventory(path: impl Into<PathBuf>, what: impl Into<String>) -> Self {
        Self::Inventory {
            path: path.into(),
            what: what.into(),
        }
    }
}

/// Errors reading a checksum manifest. Any of them rejects the whole manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read checksum manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing file path on manifest line {line}: '{content}'")]
    MissingPath { line: usize, content: String },
}

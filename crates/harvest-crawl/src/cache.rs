//! Records kept between incremental crawls.
//!
//! An incremental crawl only extracts changed files, but referential
//! integrity needs every record. The cache holds the last record of each
//! source and is stored as JSON lines next to the checkpoint.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use harvest_core::MetadataRecord;
use tracing::debug;

use crate::crawler::CrawlOutcome;
use crate::error::CrawlError;

/// Last extracted record per source, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCache {
    records: Vec<MetadataRecord>,
}

impl RecordCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache file stored beside `checkpoint`.
    #[must_use]
    pub fn path_for(checkpoint: &Path) -> PathBuf {
        checkpoint.with_extension("records.jsonl")
    }

    /// Fold one crawl into the cache.
    ///
    /// Every visited source loses its old record, the crawl's records are
    /// stored, and sources whose files no longer exist are dropped.
    pub fn refresh(&mut self, outcome: &CrawlOutcome) {
        let visited: BTreeSet<&str> = outcome.visited.iter().map(String::as_str).collect();
        let fresh: BTreeSet<&str> = outcome.records.iter().map(|r| r.source.as_str()).collect();
        self.records.retain(|record| {
            let source = record.source.as_str();
            fresh.contains(source) || (!visited.contains(source) && Path::new(source).exists())
        });

        for record in &outcome.records {
            match self.records.iter_mut().find(|cached| cached.source == record.source) {
                Some(cached) => cached.clone_from(record),
                None => self.records.push(record.clone()),
            }
        }
        debug!(records = self.records.len(), "record cache refreshed");
    }

    #[must_use]
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load a saved cache. A missing file yields an empty cache.
    ///
    /// # Errors
    /// Returns [`CrawlError::Io`] when the file cannot be read or a line is
    /// not a record.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let records = serde_jsonlines::json_lines::<MetadataRecord, _>(path)
            .and_then(|lines| lines.collect::<std::io::Result<Vec<_>>>())
            .map_err(|err| CrawlError::io(path, err))?;
        Ok(Self { records })
    }

    /// # Errors
    /// Returns [`CrawlError::Io`] when the file or its parent directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CrawlError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| CrawlError::io(parent, err))?;
        }
        serde_jsonlines::write_json_lines(path, &self.records).map_err(|err| CrawlError::io(path, err))
    }
}

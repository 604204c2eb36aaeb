//! # harvest-crawl
//!
//! Crawl side of the archive harvester.
//!
//! - **Filters**: wildcard name predicates for files and directories
//! - **Walker**: deterministic depth-first enumeration of crawl roots
//! - **Admission**: the per-file state machine deciding good, bad, skipped or
//!   suppressed, with an incremental modification-time checkpoint
//! - **Record cache**: the last record of every source, kept between
//!   incremental crawls for referential integrity
//! - **Inventories**: collection tables that exclude secondary members
//! - **Manifests**: checksum manifests compared with label-declared checksums
//! - **Crawler**: drives admission, extraction and product checks for each root

pub mod admission;
pub mod cache;
pub mod checkpoint;
pub mod crawler;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod manifest;
pub mod walk;

pub use admission::{Admission, Admitter, Exclusions, SkipReason};
pub use cache::RecordCache;
pub use checkpoint::{CrawlCheckpoint, Freshness};
pub use crawler::{CrawlItem, CrawlOutcome, Crawler, RecordSink};
pub use error::{CrawlError, ManifestError};
pub use filter::{Filters, NameFilter, Wildcards};
pub use inventory::{CollectionInventory, collection_exclusions};
pub use manifest::ChecksumManifest;

use std::path::{Path, PathBuf};

/// Absolute, component-normalized form of `path` used as a lookup key.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .components()
        .collect()
}

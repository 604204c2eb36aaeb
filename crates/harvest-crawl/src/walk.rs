//! Directory walker for crawl roots.
//!
//! Uses the `ignore` crate with every standard filter disabled: archives are
//! crawled in full, hidden files included, and `.gitignore` files carry no
//! meaning. Directory pruning comes only from the configured directory filter.
//!
//! Entries are sorted by file name so a crawl visits files in the same
//! depth-first order on every run.

use std::path::{Path, PathBuf};

use harvest_label::Dialect;
use ignore::WalkBuilder;
use tracing::warn;

use crate::error::CrawlError;
use crate::filter::Filters;

/// Candidate files for `dialect` under `root`, in crawl order.
///
/// Unreadable entries are logged and skipped.
///
/// # Errors
/// Returns [`CrawlError::MissingRoot`] when `root` does not exist.
pub fn candidate_files(
    root: &Path,
    dialect: Dialect,
    filters: &Filters,
) -> Result<Vec<PathBuf>, CrawlError> {
    if !root.exists() {
        return Err(CrawlError::MissingRoot(root.to_path_buf()));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let directories = filters.clone();
    builder.filter_entry(move |entry| {
        entry.depth() == 0
            || !entry.file_type().is_some_and(|ft| ft.is_dir())
            || directories.accepts_directory(entry.path())
    });

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && filters.accepts_file(entry.path(), dialect)
                {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!(root = %root.display(), "Skipping unreadable entry: {err}"),
        }
    }
    Ok(files)
}

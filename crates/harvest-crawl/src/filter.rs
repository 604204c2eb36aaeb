//! Name predicates for files and directories.
//!
//! Wildcards are matched against the final path component only. Matching is
//! case-insensitive on Windows and case-sensitive everywhere else.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use harvest_config::{DirectoryFilterConfig, FileFilterConfig};
use harvest_label::Dialect;

use crate::error::CrawlError;

/// A compiled set of wildcard patterns.
#[derive(Debug, Clone)]
pub struct Wildcards {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Wildcards {
    /// # Errors
    /// Returns [`CrawlError::Wildcard`] for the first pattern that does not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, CrawlError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(cfg!(windows))
                .literal_separator(true)
                .build()
                .map_err(|source| CrawlError::Wildcard {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| CrawlError::Wildcard {
            pattern: patterns
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;
        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set,
        })
    }

    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Accept-or-reject rule over a single name.
#[derive(Debug, Clone)]
pub enum NameFilter {
    Any,
    Include(Wildcards),
    Exclude(Wildcards),
}

impl NameFilter {
    /// An include list, when present, takes precedence over the exclude list.
    ///
    /// # Errors
    /// Returns [`CrawlError::Wildcard`] when a pattern does not compile.
    pub fn from_lists(include: &[String], exclude: &[String]) -> Result<Self, CrawlError> {
        if !include.is_empty() {
            Ok(Self::Include(Wildcards::new(include)?))
        } else if !exclude.is_empty() {
            Ok(Self::Exclude(Wildcards::new(exclude)?))
        } else {
            Ok(Self::Any)
        }
    }

    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Include(wildcards) => wildcards.is_match(name),
            Self::Exclude(wildcards) => !wildcards.is_match(name),
        }
    }
}

/// File and directory predicates for one crawl.
#[derive(Debug, Clone)]
pub struct Filters {
    pub files: NameFilter,
    pub directories: NameFilter,
}

impl Filters {
    /// # Errors
    /// Returns [`CrawlError::Wildcard`] when a configured pattern does not compile.
    pub fn from_config(
        files: &FileFilterConfig,
        directories: &DirectoryFilterConfig,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            files: NameFilter::from_lists(&files.include, &files.exclude)?,
            directories: NameFilter::from_lists(&[], &directories.exclude)?,
        })
    }

    /// Whether a file is a crawl candidate for `dialect`.
    ///
    /// The extension must select `dialect` and the name must pass the file filter.
    #[must_use]
    pub fn accepts_file(&self, path: &Path, dialect: Dialect) -> bool {
        Dialect::from_path(path) == Some(dialect) && self.files.accepts(&file_name(path))
    }

    #[must_use]
    pub fn accepts_directory(&self, path: &Path) -> bool {
        self.directories.accepts(&file_name(path))
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            files: NameFilter::Any,
            directories: NameFilter::Any,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

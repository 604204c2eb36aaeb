//! The crawl loop: admission, extraction and product checks per file.

use std::path::{Path, PathBuf};

use harvest_config::CrawlConfig;
use harvest_core::{MetadataRecord, Problem, ProblemKind, RunStatistics};
use harvest_label::checks::{check_record, structural_problem};
use harvest_label::extract::declared_files;
use harvest_label::{Dialect, Extractor, LabelTree, MetadataExtractor, Policy};
use tracing::{debug, info};

use crate::admission::{Admission, Admitter, Exclusions};
use crate::checkpoint::CrawlCheckpoint;
use crate::error::CrawlError;
use crate::filter::Filters;
use crate::inventory::collection_exclusions;
use crate::manifest::ChecksumManifest;
use crate::walk::candidate_files;

/// Destination for extracted records.
pub trait RecordSink {
    /// # Errors
    /// Returns an I/O error when the record cannot be written.
    fn accept(&mut self, record: &MetadataRecord) -> std::io::Result<()>;
}

impl RecordSink for Vec<MetadataRecord> {
    fn accept(&mut self, record: &MetadataRecord) -> std::io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Findings for one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    pub source: String,
    pub problems: Vec<Problem>,
}

/// Everything one crawl produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Good and bad files in crawl order; skipped and suppressed files have no item.
    pub items: Vec<CrawlItem>,
    /// Records of good, structurally valid files.
    pub records: Vec<MetadataRecord>,
    /// Every file admitted or skipped this crawl. Unchanged and claimed files are absent.
    pub visited: Vec<String>,
    pub statistics: RunStatistics,
}

impl CrawlOutcome {
    pub fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
        self.records.extend(other.records);
        self.visited.extend(other.visited);
        self.statistics += other.statistics;
    }
}

/// Crawls the configured roots under one policy.
#[derive(Debug)]
pub struct Crawler<'p> {
    policy: &'p Policy,
    targets: Vec<(PathBuf, Dialect)>,
    filters: Filters,
    exclusions: Exclusions,
    manifest: Option<ChecksumManifest>,
    persist: bool,
}

impl<'p> Crawler<'p> {
    /// Compile filters and read collection inventories.
    ///
    /// # Errors
    /// Returns [`CrawlError::Wildcard`] for an invalid filter pattern and any
    /// error from reading a configured collection inventory.
    pub fn new(policy: &'p Policy, config: &CrawlConfig) -> Result<Self, CrawlError> {
        let filters = Filters::from_config(&config.file_filter, &config.directory_filter)?;
        let exclusions = collection_exclusions(&config.collections)?;
        let targets = config
            .roots
            .iter()
            .map(|root| (root.clone(), Dialect::Modern))
            .chain(config.legacy_roots.iter().map(|root| (root.clone(), Dialect::Legacy)))
            .collect();
        Ok(Self {
            policy,
            targets,
            filters,
            exclusions,
            manifest: None,
            persist: config.persist,
        })
    }

    /// Compare declared file checksums against `manifest`.
    #[must_use]
    pub fn with_manifest(mut self, manifest: ChecksumManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Crawl every configured root, modern roots first.
    ///
    /// `checkpoint` is only updated when every root was crawled.
    ///
    /// # Errors
    /// Returns [`CrawlError::MissingRoot`] for an absent root and
    /// [`CrawlError::Sink`] when a record cannot be written. Per-file failures
    /// are outcomes, not errors.
    pub fn run(
        &self,
        checkpoint: &mut CrawlCheckpoint,
        sink: &mut dyn RecordSink,
    ) -> Result<CrawlOutcome, CrawlError> {
        let mut working = checkpoint.clone();
        let mut outcome = CrawlOutcome::default();
        for (root, dialect) in &self.targets {
            outcome.merge(self.crawl_root(root, *dialect, &mut working, sink)?);
        }
        *checkpoint = working;
        Ok(outcome)
    }

    /// Crawl one root for labels of `dialect`.
    ///
    /// # Errors
    /// See [`Crawler::run`].
    pub fn crawl_root(
        &self,
        root: &Path,
        dialect: Dialect,
        checkpoint: &mut CrawlCheckpoint,
        sink: &mut dyn RecordSink,
    ) -> Result<CrawlOutcome, CrawlError> {
        let files = candidate_files(root, dialect, &self.filters)?;
        info!(root = %root.display(), dialect = dialect.as_str(), candidates = files.len(), "crawling");

        let admitter = Admitter::new(self.policy, &self.exclusions, self.persist);
        let mut outcome = CrawlOutcome::default();
        for path in files {
            let admission = admitter.admit(&path, checkpoint, &mut outcome.statistics);
            if !matches!(admission, Admission::Unchanged | Admission::Claimed) {
                outcome.visited.push(path.display().to_string());
            }
            match admission {
                Admission::Unchanged | Admission::Claimed | Admission::Skipped(_) => {}
                Admission::Bad(err) => {
                    let problem = Problem::new(
                        ProblemKind::ParseFailure,
                        err.to_string(),
                        path.display().to_string(),
                    )
                    .at_line(err.line());
                    outcome.items.push(CrawlItem {
                        source: problem.source.clone(),
                        problems: vec![problem],
                    });
                }
                Admission::Good(tree) => {
                    let (item, record) = self.process(&path, &tree);
                    if let Some(record) = record {
                        sink.accept(&record).map_err(CrawlError::Sink)?;
                        outcome.records.push(record);
                    }
                    outcome.items.push(item);
                }
            }
        }
        debug!(
            root = %root.display(),
            good = outcome.statistics.good,
            bad = outcome.statistics.bad,
            skipped = outcome.statistics.skipped,
            "crawl finished"
        );
        Ok(outcome)
    }

    /// Extract and check an admitted label.
    ///
    /// A structurally invalid label yields only its structural problem and no record.
    fn process(&self, path: &Path, tree: &LabelTree) -> (CrawlItem, Option<MetadataRecord>) {
        let source = path.display().to_string();
        if let Some(problem) = structural_problem(tree, self.policy, &source) {
            info!(source, "{}", problem.message);
            return (
                CrawlItem {
                    source,
                    problems: vec![problem],
                },
                None,
            );
        }

        let extraction = Extractor::for_label(tree, self.policy).extract(tree, &source);
        let mut problems = extraction.problems;
        problems.extend(check_record(&extraction.record, self.policy));
        if let Some(manifest) = &self.manifest
            && tree.dialect() == Dialect::Modern
        {
            problems.extend(manifest.verify(path, &declared_files(tree, self.policy)));
        }
        (CrawlItem { source, problems }, Some(extraction.record))
    }
}

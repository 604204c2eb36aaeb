//! One crawl, extract, check and report cycle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use harvest_config::{CrawlConfig, HarvestConfig, ReportFormat};
use harvest_core::{Problem, RunStatistics};
use harvest_crawl::{ChecksumManifest, CrawlCheckpoint, CrawlItem, Crawler, RecordCache};
use harvest_integrity::IntegrityChecker;
use harvest_label::Policy;
use harvest_report::{JsonSink, Report, ReportHeader, ReportSink, ReportSummary, TextSink, open_output};
use tracing::{debug, info};

use crate::records::RecordOutput;

/// Output destinations shared by every cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleOutputs {
    pub records: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// What one cycle hands the next: the checkpoint and the records behind it.
#[derive(Debug, Clone, Default)]
pub struct CycleState {
    pub checkpoint: CrawlCheckpoint,
    pub records: RecordCache,
}

/// Compiled configuration a cycle runs against. Built once at startup.
#[derive(Debug)]
pub struct Harvester {
    config: HarvestConfig,
    config_source: Option<PathBuf>,
    policy: Policy,
    manifest: Option<ChecksumManifest>,
    outputs: CycleOutputs,
}

impl Harvester {
    /// Compile the policy and read the checksum manifest.
    pub fn new(
        config: HarvestConfig,
        config_source: Option<PathBuf>,
        outputs: CycleOutputs,
    ) -> anyhow::Result<Self> {
        let policy = Policy::compile(&config).context("invalid extraction policy")?;
        let manifest = match &config.checksums.manifest {
            Some(path) => {
                let base = config.checksums.resolved_base().unwrap_or_default();
                let manifest = ChecksumManifest::read(path, &base)
                    .with_context(|| format!("failed to read checksum manifest {}", path.display()))?;
                info!(manifest = %path.display(), entries = manifest.len(), "checksum manifest loaded");
                Some(manifest)
            }
            None => None,
        };
        Ok(Self {
            config,
            config_source,
            policy,
            manifest,
            outputs,
        })
    }

    /// A harvester that crawls only the catalog files under `dir`.
    pub fn for_catalog(
        mut config: HarvestConfig,
        config_source: Option<PathBuf>,
        dir: &Path,
        report: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let crawl = std::mem::take(&mut config.crawl);
        config.crawl = CrawlConfig {
            legacy_roots: vec![dir.to_path_buf()],
            file_filter: crawl.file_filter,
            directory_filter: crawl.directory_filter,
            ..CrawlConfig::default()
        };
        config.checksums.manifest = None;
        Self::new(
            config,
            config_source,
            CycleOutputs {
                records: None,
                report,
            },
        )
    }

    /// The persisted cycle state, or an empty one when no checkpoint is configured.
    pub fn load_state(&self) -> anyhow::Result<CycleState> {
        let Some(path) = &self.config.crawl.checkpoint_path else {
            return Ok(CycleState::default());
        };
        let checkpoint = CrawlCheckpoint::load(path).context("failed to load crawl checkpoint")?;
        let records =
            RecordCache::load(&RecordCache::path_for(path)).context("failed to load record cache")?;
        debug!(entries = checkpoint.len(), records = records.len(), "cycle state loaded");
        Ok(CycleState { checkpoint, records })
    }

    fn save_state(&self, state: &CycleState) -> anyhow::Result<()> {
        if let Some(path) = &self.config.crawl.checkpoint_path {
            state
                .checkpoint
                .save(path)
                .context("failed to save crawl checkpoint")?;
            state
                .records
                .save(&RecordCache::path_for(path))
                .context("failed to save record cache")?;
            debug!(
                path = %path.display(),
                entries = state.checkpoint.len(),
                records = state.records.len(),
                "cycle state saved"
            );
        }
        Ok(())
    }

    /// Run one full cycle and persist its state.
    ///
    /// Referential integrity covers every cached record, not only the files
    /// crawled this cycle. `state` is replaced only when the cycle succeeds.
    pub fn run_cycle(&self, state: &mut CycleState) -> anyhow::Result<ReportSummary> {
        let mut crawler =
            Crawler::new(&self.policy, &self.config.crawl).context("failed to prepare crawl")?;
        if let Some(manifest) = &self.manifest {
            crawler = crawler.with_manifest(manifest.clone());
        }

        let mut checkpoint = state.checkpoint.clone();
        let mut records = RecordOutput::open(self.outputs.records.as_deref())?;
        let outcome = crawler.run(&mut checkpoint, &mut records).context("crawl failed")?;
        records.flush().context("failed to flush record output")?;

        let mut cache = if self.config.crawl.persist {
            state.records.clone()
        } else {
            RecordCache::new()
        };
        cache.refresh(&outcome);
        let integrity = IntegrityChecker::new(&self.config.integrity).check(cache.records());
        let items = attach(outcome.items, integrity.problems);

        let summary = self.report(&items, outcome.statistics)?;
        let next = CycleState {
            checkpoint,
            records: cache,
        };
        self.save_state(&next)?;
        *state = next;
        Ok(summary)
    }

    fn report(&self, items: &[CrawlItem], statistics: RunStatistics) -> anyhow::Result<ReportSummary> {
        let out = open_output(self.outputs.report.as_deref())?;
        let sink: Box<dyn ReportSink> = match self.config.report.format {
            ReportFormat::Text => Box::new(TextSink::new(out)),
            ReportFormat::Json => Box::new(JsonSink::new(out)),
        };

        let mut report = Report::new(self.config.report.level, sink);
        report.begin(&self.header())?;
        for item in items {
            report.record(&item.source, &item.problems)?;
        }
        Ok(report.finish(statistics)?)
    }

    fn header(&self) -> ReportHeader {
        let crawl = &self.config.crawl;
        let config_file = self
            .config_source
            .as_ref()
            .map_or_else(|| String::from("(default search)"), |path| path.display().to_string());

        let mut header = ReportHeader::default()
            .configuration("Version", env!("CARGO_PKG_VERSION"))
            .configuration("Configuration File", config_file)
            .parameter("Roots", join_paths(&crawl.roots))
            .parameter("Catalog Roots", join_paths(&crawl.legacy_roots))
            .parameter("Severity Level", self.config.report.level.label())
            .parameter("Incremental", crawl.persist.to_string());
        if let Some(path) = &self.config.checksums.manifest {
            header = header.parameter("Checksum Manifest", path.display().to_string());
        }
        header
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return String::from("-");
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fold batch-level problems into the items they were found in.
///
/// A problem whose source has no item, such as a cached record not crawled
/// this cycle, gets a new item at the end.
fn attach(mut items: Vec<CrawlItem>, problems: Vec<Problem>) -> Vec<CrawlItem> {
    let mut index: BTreeMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(position, item)| (item.source.clone(), position))
        .collect();
    for problem in problems {
        if let Some(&position) = index.get(&problem.source) {
            items[position].problems.push(problem);
        } else {
            index.insert(problem.source.clone(), items.len());
            items.push(CrawlItem {
                source: problem.source.clone(),
                problems: vec![problem],
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::ProblemKind;
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};

    fn item(source: &str) -> CrawlItem {
        CrawlItem {
            source: source.into(),
            problems: vec![],
        }
    }

    #[test]
    fn batch_problems_join_their_items() {
        let items = vec![item("a.cat"), item("b.cat")];
        let problems = vec![
            Problem::new(ProblemKind::UnmatchedReference, "x", "b.cat"),
            Problem::new(ProblemKind::UnmatchedReference, "y", "c.cat"),
            Problem::new(ProblemKind::UnmatchedReference, "z", "b.cat"),
        ];
        let items = attach(items, problems);

        let shape: Vec<(&str, usize)> = items
            .iter()
            .map(|item| (item.source.as_str(), item.problems.len()))
            .collect();
        assert_eq!(shape, vec![("a.cat", 0), ("b.cat", 2), ("c.cat", 1)]);
    }

    #[test]
    fn join_paths_marks_empty_lists() {
        assert_eq!(join_paths(&[]), "-");
        assert_eq!(
            join_paths(&[PathBuf::from("a"), PathBuf::from("b")]),
            "a, b"
        );
    }

    const MISSION: &str = "PDS_VERSION_ID = PDS3\nOBJECT = MISSION\n  MISSION_NAME = \"MGS\"\nEND_OBJECT = MISSION\nEND\n";
    const DATA_SET: &str = "PDS_VERSION_ID = PDS3\nOBJECT = DATA_SET\n  MISSION_NAME = \"MGS\"\nEND_OBJECT = DATA_SET\nEND\n";

    #[test]
    fn incremental_cycle_checks_integrity_against_cached_records() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = tmp.path().join("catalog");
        fs::create_dir_all(&catalog).unwrap();
        fs::write(catalog.join("mission.cat"), MISSION).unwrap();
        fs::write(catalog.join("dataset.cat"), DATA_SET).unwrap();

        let checkpoint = tmp.path().join("state/checkpoint.json");
        let mut config = HarvestConfig::default();
        config.crawl = CrawlConfig {
            legacy_roots: vec![catalog.clone()],
            persist: true,
            checkpoint_path: Some(checkpoint.clone()),
            ..CrawlConfig::default()
        };
        let outputs = CycleOutputs {
            records: None,
            report: Some(tmp.path().join("report.txt")),
        };
        let harvester = Harvester::new(config, None, outputs).unwrap();

        let mut state = harvester.load_state().unwrap();
        let first = harvester.run_cycle(&mut state).unwrap();
        assert_eq!((first.totals.passed, first.totals.failed), (2, 0));

        File::options()
            .write(true)
            .open(catalog.join("dataset.cat"))
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(10))
            .unwrap();

        // A fresh load proves the cache survives on disk.
        let mut state = harvester.load_state().unwrap();
        assert_eq!(state.records.len(), 2);
        let second = harvester.run_cycle(&mut state).unwrap();
        assert_eq!(second.crawl.good, 1);
        assert_eq!((second.totals.passed, second.totals.failed), (1, 0));
        assert_eq!(second.totals.errors, 0);
        assert!(RecordCache::path_for(&checkpoint).is_file());
    }

    #[test]
    fn failed_cycle_keeps_the_previous_state() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = HarvestConfig::default();
        config.crawl = CrawlConfig {
            legacy_roots: vec![tmp.path().join("absent")],
            persist: true,
            ..CrawlConfig::default()
        };
        let harvester = Harvester::new(config, None, CycleOutputs::default()).unwrap();

        let mut state = CycleState::default();
        assert!(harvester.run_cycle(&mut state).is_err());
        assert!(state.checkpoint.is_empty());
        assert!(state.records.is_empty());
    }
}

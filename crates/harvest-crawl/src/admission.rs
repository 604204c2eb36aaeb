//! Per-file admission.
//!
//! Each candidate file runs through an ordered, short-circuiting pipeline:
//!
//! 1. incremental mode: an unchanged modification time suppresses the file
//! 2. files claimed by another stage (inventory tables) are suppressed
//! 3. a parse failure makes the file `Bad`
//! 4. a non-primary member identifier makes it `Skipped`
//! 5. a missing or unrecognized object type makes it `Skipped`, else `Good`
//!
//! Suppressed files touch no counters.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use harvest_core::{Identifier, RunStatistics};
use harvest_label::{Extractor, LabelError, LabelTree, MetadataExtractor, Policy, parse_file};
use tracing::{debug, info, warn};

use crate::checkpoint::{CrawlCheckpoint, Freshness};
use crate::normalize_path;

/// Why an admitted file was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotPrimaryMember(Identifier),
    NoObjectType,
    UnknownObjectType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPrimaryMember(_) => f.write_str("Not a primary member."),
            Self::NoObjectType => f.write_str("No product_class element found."),
            Self::UnknownObjectType(object_type) => write!(
                f,
                "'{object_type}' is not an object type found in the policy file."
            ),
        }
    }
}

/// Terminal outcome of admitting one file.
#[derive(Debug)]
pub enum Admission {
    /// Modification time unchanged since the last cycle.
    Unchanged,
    /// Claimed by another stage.
    Claimed,
    Bad(LabelError),
    Skipped(SkipReason),
    /// Admitted; carries the parsed label on to extraction.
    Good(LabelTree),
}

impl Admission {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Claimed => "claimed",
            Self::Bad(_) => "bad",
            Self::Skipped(_) => "skipped",
            Self::Good(_) => "good",
        }
    }

    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Claimed)
    }
}

/// Identifiers and files excluded before admission, on top of the policy's
/// own non-primary member list.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    non_primary: Vec<Identifier>,
    claimed: BTreeSet<PathBuf>,
}

impl Exclusions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_non_primary(&mut self, identifier: Identifier) {
        if !self.non_primary.contains(&identifier) {
            self.non_primary.push(identifier);
        }
    }

    pub fn claim(&mut self, path: &Path) {
        self.claimed.insert(normalize_path(path));
    }

    #[must_use]
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains(&normalize_path(path))
    }

    #[must_use]
    pub fn non_primary(&self) -> &[Identifier] {
        &self.non_primary
    }

    pub fn merge(&mut self, other: Self) {
        for identifier in other.non_primary {
            self.add_non_primary(identifier);
        }
        self.claimed.extend(other.claimed);
    }

    /// Whether an exclusion entry covers `identifier`.
    ///
    /// An unversioned entry excludes every version of its LID.
    #[must_use]
    pub fn excludes(&self, policy: &Policy, identifier: &Identifier) -> bool {
        policy
            .non_primary_members()
            .iter()
            .chain(&self.non_primary)
            .any(|entry| entry.covers(identifier))
    }
}

/// Runs the admission pipeline for files of one crawl.
#[derive(Debug, Clone, Copy)]
pub struct Admitter<'a> {
    policy: &'a Policy,
    exclusions: &'a Exclusions,
    persist: bool,
}

impl<'a> Admitter<'a> {
    #[must_use]
    pub const fn new(policy: &'a Policy, exclusions: &'a Exclusions, persist: bool) -> Self {
        Self {
            policy,
            exclusions,
            persist,
        }
    }

    /// Admit `path`, updating `checkpoint` in incremental mode and counting
    /// the outcome in `stats`.
    pub fn admit(
        &self,
        path: &Path,
        checkpoint: &mut CrawlCheckpoint,
        stats: &mut RunStatistics,
    ) -> Admission {
        let source = path.display().to_string();

        if self.persist {
            let modified = match std::fs::metadata(path).and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    stats.record_bad();
                    warn!(source, "Could not read modification time: {err}");
                    return Admission::Bad(LabelError::Io(err));
                }
            };
            if checkpoint.observe(path, modified) == Freshness::Unchanged {
                debug!(source, "Unchanged since last crawl.");
                return Admission::Unchanged;
            }
        }

        if self.exclusions.is_claimed(path) {
            debug!(source, "Claimed by a collection inventory.");
            return Admission::Claimed;
        }

        let tree = match parse_file(path) {
            Ok(tree) => tree,
            Err(err) => {
                stats.record_bad();
                warn!(source, line = err.line(), "{err}");
                return Admission::Bad(err);
            }
        };

        let extractor = Extractor::for_label(&tree, self.policy);
        if let Some(identifier) = extractor.identifier(&tree)
            && self.exclusions.excludes(self.policy, &identifier)
        {
            return skip(&source, SkipReason::NotPrimaryMember(identifier), stats);
        }

        let object_type = extractor.object_type(&tree);
        if object_type.is_empty() {
            return skip(&source, SkipReason::NoObjectType, stats);
        }
        if !self.policy.recognizes(&object_type) {
            return skip(&source, SkipReason::UnknownObjectType(object_type), stats);
        }

        stats.record_good();
        debug!(source, object_type, "Admitted.");
        Admission::Good(tree)
    }
}

fn skip(source: &str, reason: SkipReason, stats: &mut RunStatistics) -> Admission {
    stats.record_skipped();
    info!(source, "Skipping file: {reason}");
    Admission::Skipped(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_config::{HarvestConfig, ObjectTypeConfig};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;

    fn label(lid: &str, version: &str, product_class: Option<&str>) -> String {
        let class = product_class
            .map(|c| format!("<product_class>{c}</product_class>"))
            .unwrap_or_default();
        format!(
            r#"<Product_Observational xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>{lid}</logical_identifier>
    <version_id>{version}</version_id>
    <title>Test</title>
    {class}
  </Identification_Area>
</Product_Observational>"#
        )
    }

    fn policy(non_primary: &[&str]) -> Policy {
        let mut config = HarvestConfig::default();
        config.policy.object_types.push(ObjectTypeConfig {
            name: "Product_Observational".into(),
            rules: vec![],
        });
        config.policy.non_primary_members = non_primary.iter().map(|s| (*s).to_string()).collect();
        Policy::compile(&config).unwrap()
    }

    fn admit(policy: &Policy, exclusions: &Exclusions, path: &Path) -> (Admission, RunStatistics) {
        let mut stats = RunStatistics::default();
        let mut checkpoint = CrawlCheckpoint::new();
        let admission =
            Admitter::new(policy, exclusions, false).admit(path, &mut checkpoint, &mut stats);
        (admission, stats)
    }

    #[test]
    fn recognized_label_is_good() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.xml");
        fs::write(&path, label("urn:nasa:pds:x:a", "1.0", Some("Product_Observational"))).unwrap();

        let (admission, stats) = admit(&policy(&[]), &Exclusions::new(), &path);
        assert!(matches!(admission, Admission::Good(_)));
        assert_eq!(stats, RunStatistics { good: 1, bad: 0, skipped: 0 });
    }

    #[test]
    fn parse_failure_is_bad() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.xml");
        fs::write(&path, "<Product_Observational><unclosed></Product_Observational>").unwrap();

        let (admission, stats) = admit(&policy(&[]), &Exclusions::new(), &path);
        assert!(matches!(admission, Admission::Bad(LabelError::ParseFailed { .. })));
        assert_eq!(stats, RunStatistics { good: 0, bad: 1, skipped: 0 });
    }

    #[rstest]
    #[case(None, "No product_class element found.")]
    #[case(Some("Product_Thumbnail"), "'Product_Thumbnail' is not an object type found in the policy file.")]
    fn object_type_skips(#[case] product_class: Option<&str>, #[case] message: &str) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.xml");
        fs::write(&path, label("urn:nasa:pds:x:a", "1.0", product_class)).unwrap();

        let (admission, stats) = admit(&policy(&[]), &Exclusions::new(), &path);
        let Admission::Skipped(reason) = admission else {
            panic!("expected a skip, got {}", admission.as_str());
        };
        assert_eq!(reason.to_string(), message);
        assert_eq!(stats.skipped, 1);
    }

    #[rstest]
    #[case("urn:x::2", "2.0", false)]
    #[case("urn:x::2.0", "2.0", true)]
    #[case("urn:x::2.0", "3.0", false)]
    #[case("urn:x", "1.0", true)]
    #[case("urn:x", "7.0", true)]
    #[case("urn:y", "1.0", false)]
    fn non_primary_exclusion(#[case] entry: &str, #[case] version: &str, #[case] excluded: bool) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.xml");
        fs::write(&path, label("urn:x", version, Some("Product_Observational"))).unwrap();

        let (admission, _) = admit(&policy(&[entry]), &Exclusions::new(), &path);
        assert_eq!(
            matches!(admission, Admission::Skipped(SkipReason::NotPrimaryMember(_))),
            excluded
        );
    }

    #[test]
    fn inventory_exclusions_apply_too() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.xml");
        fs::write(&path, label("urn:x", "1.0", Some("Product_Observational"))).unwrap();

        let mut exclusions = Exclusions::new();
        exclusions.add_non_primary(Identifier::versioned("urn:x", "1.0"));
        let (admission, _) = admit(&policy(&[]), &exclusions, &path);
        assert_eq!(admission.as_str(), "skipped");
    }

    #[test]
    fn claimed_files_are_suppressed_without_counting() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inventory.xml");
        fs::write(&path, "not even a label").unwrap();

        let mut exclusions = Exclusions::new();
        exclusions.claim(&path);
        let (admission, stats) = admit(&policy(&[]), &exclusions, &path);
        assert!(admission.is_suppressed());
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn incremental_mode_suppresses_unchanged_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.xml");
        fs::write(&path, label("urn:x", "1.0", Some("Product_Observational"))).unwrap();

        let policy = policy(&[]);
        let exclusions = Exclusions::new();
        let admitter = Admitter::new(&policy, &exclusions, true);
        let mut checkpoint = CrawlCheckpoint::new();
        let mut stats = RunStatistics::default();

        assert_eq!(admitter.admit(&path, &mut checkpoint, &mut stats).as_str(), "good");
        assert_eq!(admitter.admit(&path, &mut checkpoint, &mut stats).as_str(), "unchanged");
        assert_eq!(stats, RunStatistics { good: 1, bad: 0, skipped: 0 });
    }
}

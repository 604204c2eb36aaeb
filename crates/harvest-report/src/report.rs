//! The status fold.
//!
//! Each item's problems are classified once against the report threshold. The
//! threshold gates both what is counted and what reaches the sink. Totals are
//! plain sums, so they do not depend on the order items arrive in.

use harvest_core::{Problem, RunStatistics, Severity, Status};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ReportError;
use crate::sink::ReportSink;

/// Status and threshold-filtered problem counts for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub status: Status,
    pub errors: u64,
    pub warnings: u64,
    pub infos: u64,
}

/// Classify one item's problems at `level`.
///
/// A structural problem makes the item SKIP whatever else it carries.
/// Otherwise any counted error makes it FAIL.
#[must_use]
pub fn assess(problems: &[Problem], level: Severity) -> Assessment {
    let mut assessment = Assessment {
        status: Status::Pass,
        errors: 0,
        warnings: 0,
        infos: 0,
    };
    let mut structural = false;
    for problem in problems {
        structural |= problem.is_structural();
        if !problem.severity.is_within(level) {
            continue;
        }
        match problem.severity {
            Severity::Error => assessment.errors += 1,
            Severity::Warning => assessment.warnings += 1,
            Severity::Info => assessment.infos += 1,
        }
    }
    assessment.status = if structural {
        Status::Skip
    } else if assessment.errors > 0 {
        Status::Fail
    } else {
        Status::Pass
    };
    assessment
}

/// Run-level report counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub errors: u64,
    pub warnings: u64,
    pub infos: u64,
}

impl ReportTotals {
    /// Fold one assessment in. Skipped items only bump the skipped count.
    pub const fn record(&mut self, assessment: &Assessment) {
        match assessment.status {
            Status::Skip => {
                self.skipped += 1;
                return;
            }
            Status::Fail => self.failed += 1,
            Status::Pass => self.passed += 1,
        }
        self.errors += assessment.errors;
        self.warnings += assessment.warnings;
        self.infos += assessment.infos;
    }

    /// Totals for a batch of problem lists, without any output.
    #[must_use]
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a [Problem]>, level: Severity) -> Self {
        let mut totals = Self::default();
        for problems in items {
            totals.record(&assess(problems, level));
        }
        totals
    }

    #[must_use]
    pub const fn validated(&self) -> u64 {
        self.passed + self.failed
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.validated() + self.skipped
    }
}

/// Header lines describing how the run was configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportHeader {
    pub configuration: Vec<(String, String)>,
    pub parameters: Vec<(String, String)>,
}

impl ReportHeader {
    #[must_use]
    pub fn configuration(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }
}

/// One reported item as the sink sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport<'a> {
    pub status: Status,
    pub source: &'a str,
    /// Problems within the threshold, in input order.
    pub problems: Vec<&'a Problem>,
}

/// Final counters: report totals plus the crawl's good/bad/skipped counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub totals: ReportTotals,
    pub crawl: RunStatistics,
}

/// Accumulates item statuses and forwards them to a sink.
#[derive(Debug)]
pub struct Report<S> {
    level: Severity,
    totals: ReportTotals,
    sink: S,
}

impl<S: ReportSink> Report<S> {
    pub fn new(level: Severity, sink: S) -> Self {
        Self {
            level,
            totals: ReportTotals::default(),
            sink,
        }
    }

    #[must_use]
    pub const fn level(&self) -> Severity {
        self.level
    }

    #[must_use]
    pub const fn totals(&self) -> ReportTotals {
        self.totals
    }

    /// Write the report header.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] when the sink cannot be written.
    pub fn begin(&mut self, header: &ReportHeader) -> Result<(), ReportError> {
        self.sink.header(header)
    }

    /// Classify and emit one item.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] when the sink cannot be written. The totals
    /// already include the item.
    pub fn record(&mut self, source: &str, problems: &[Problem]) -> Result<Status, ReportError> {
        let assessment = assess(problems, self.level);
        self.totals.record(&assessment);
        debug!(
            source,
            status = assessment.status.as_str(),
            errors = assessment.errors,
            warnings = assessment.warnings,
            infos = assessment.infos,
            "item reported"
        );

        let item = ItemReport {
            status: assessment.status,
            source,
            problems: problems
                .iter()
                .filter(|problem| problem.severity.is_within(self.level))
                .collect(),
        };
        self.sink.item(&item)?;
        Ok(assessment.status)
    }

    /// Write the summary and return it.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] when the sink cannot be written.
    pub fn finish(mut self, crawl: RunStatistics) -> Result<ReportSummary, ReportError> {
        let summary = ReportSummary {
            totals: self.totals,
            crawl,
        };
        self.sink.summary(&summary)?;
        info!(
            passed = summary.totals.passed,
            failed = summary.totals.failed,
            skipped = summary.totals.skipped,
            errors = summary.totals.errors,
            warnings = summary.totals.warnings,
            "report finished"
        );
        Ok(summary)
    }
}

//! # harvest-report
//!
//! Per-item status aggregation and report output.
//!
//! [`Report`] folds each item's problems into a PASS, FAIL or SKIP status and
//! run totals, gated by a minimum-severity threshold. Items and the final
//! summary go to a [`ReportSink`]: [`TextSink`] for people, [`JsonSink`] for
//! JSON lines.

pub mod error;
pub mod report;
pub mod sink;

pub use error::ReportError;
pub use report::{Assessment, ItemReport, Report, ReportHeader, ReportSummary, ReportTotals, assess};
pub use sink::{JsonSink, ReportSink, TextSink, open_output};

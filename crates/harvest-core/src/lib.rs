//! # harvest-core
//!
//! Core types shared across the harvester crates.
//!
//! This crate provides the foundational value types every other crate passes around:
//! - The LID/LIDVID identifier model and its matching rules
//! - The extracted metadata record (identity, title, references, slots)
//! - Problems with severity and provenance, and per-item statuses
//! - Run-level good/bad/skipped counters
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod ids;
pub mod problem;
pub mod record;
pub mod stats;

pub use enums::{ProblemKind, Severity, Status};
pub use errors::CoreError;
pub use ids::Identifier;
pub use problem::Problem;
pub use record::{MetadataRecord, ReferenceEntry, Slot};
pub use stats::RunStatistics;

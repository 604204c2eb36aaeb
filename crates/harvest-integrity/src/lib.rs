//! # harvest-integrity
//!
//! Referential integrity across a batch of catalog records.
//!
//! For each category (data set, instrument, mission, ...) records declaring
//! the category's object are parents and every other record is a child. Each
//! value a child gives for the category's identifying keyword must match a
//! value some parent gives for it; values that do not are reported.

pub mod checker;
pub mod matcher;
pub mod sorter;

pub use checker::{IntegrityChecker, IntegrityReport};
pub use matcher::{Unmatched, ValueMatcher};
pub use sorter::{Partition, partition};

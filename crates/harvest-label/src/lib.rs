//! # harvest-label
//!
//! Label reading and metadata extraction for the archive harvester.
//!
//! - **Readers**: modern XML labels (`roxmltree`) and legacy keyword labels
//!   both produce the same [`LabelTree`]
//! - **Path expressions**: a small query language over the tree with
//!   line/column provenance on every match
//! - **Extraction**: [`Extractor`] turns a tree into a
//!   [`harvest_core::MetadataRecord`] under a compiled [`Policy`]
//! - **Checks**: structural validity and record-level product checks

pub mod checks;
pub mod error;
pub mod extract;
mod odl;
pub mod parser;
pub mod path;
pub mod policy;
pub mod tree;

pub use error::{LabelError, PathError};
pub use extract::{Extraction, Extractor, ExtractorKind, MetadataExtractor};
pub use parser::{Dialect, LabelParser, LegacyParser, ModernParser, parse_file};
pub use path::PathExpr;
pub use policy::Policy;
pub use tree::{LabelTree, NodeRef};

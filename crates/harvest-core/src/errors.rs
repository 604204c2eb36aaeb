//! Cross-cutting error types for the harvester.
//!
//! Domain-specific errors (`ConfigError`, `LabelError`, `CrawlError`, ...) live in
//! their own crates. Only value-type validation failures are raised here.

use thiserror::Error;

/// Errors that can be raised while building core value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A LID or LIDVID token could not be parsed.
    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// A severity or status name was not recognized.
    #[error("Unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}

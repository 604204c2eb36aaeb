//! Error types for label reading and path expressions.

/// Errors raised while reading a label.
///
/// These never escape a crawl: admission turns them into a `Bad` outcome.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("Parse failed at line {line}: {message}")]
    ParseFailed { line: u32, message: String },

    #[error("Unsupported label extension: {0}")]
    UnsupportedDialect(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    pub(crate) fn parse(line: u32, message: impl Into<String>) -> Self {
        Self::ParseFailed {
            line,
            message: message.into(),
        }
    }

    /// Line the failure was detected on, when known.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        match self {
            Self::ParseFailed { line, .. } => Some(*line),
            Self::UnsupportedDialect(_) | Self::Io(_) => None,
        }
    }
}

/// Errors raised while compiling a path expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Empty path expression")]
    Empty,

    #[error("Invalid path expression '{expr}' at offset {offset}: {reason}")]
    Syntax {
        expr: String,
        offset: usize,
        reason: String,
    },

    #[error("Unknown namespace prefix '{prefix}' in path expression '{expr}'")]
    UnknownPrefix { expr: String, prefix: String },
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{ProblemKind, Severity};

/// A finding against one source, produced by parsing, extraction, product
/// checks, or referential-integrity checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Problem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub message: String,
    /// File path or URI the problem was found in.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Problem {
    /// A problem with the kind's default severity and no position.
    pub fn new(kind: ProblemKind, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            source: source.into(),
            line: None,
            column: None,
        }
    }

    #[must_use]
    pub const fn at_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub const fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  ", self.severity.label())?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "line {line}, {column}: ")?,
            (Some(line), None) => write!(f, "line {line}: ")?,
            _ => {}
        }
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_kind_default_severity() {
        let p = Problem::new(ProblemKind::TitleTooLong, "too long", "a.xml");
        assert_eq!(p.severity, Severity::Warning);
        assert_eq!(p.line, None);
    }

    #[test]
    fn display_includes_position_when_known() {
        let p = Problem::new(ProblemKind::MalformedReference, "bad token", "a.xml").at(12, 4);
        assert_eq!(p.to_string(), "ERROR  line 12, 4: bad token");

        let p = Problem::new(ProblemKind::NoAssociations, "none", "a.xml").at_line(Some(3));
        assert_eq!(p.to_string(), "INFO  line 3: none");

        let p = Problem::new(ProblemKind::UnmatchedReference, "orphan", "a.cat");
        assert_eq!(p.to_string(), "ERROR  orphan");
    }
}

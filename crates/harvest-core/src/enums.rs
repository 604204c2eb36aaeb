//! Severity, problem kinds and per-item statuses.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! except [`Status`], which serializes in the upper-case form reports print.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a [`crate::Problem`].
///
/// Ordered from most to least severe. A report threshold of `Warning` counts
/// errors and warnings and drops infos.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Numeric rank; lower is more severe.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Error => 1,
            Self::Warning => 2,
            Self::Info => 3,
        }
    }

    /// Whether a problem of this severity passes a report threshold.
    #[must_use]
    pub const fn is_within(self, threshold: Self) -> bool {
        self.rank() <= threshold.rank()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Upper-case label used in report lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "severe" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(CoreError::UnknownName {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Terminal classification of a reported item.
///
/// `Skip` takes precedence over `Fail`: a structurally invalid label is skipped
/// even when it also carries ordinary errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    Skip,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProblemKind
// ---------------------------------------------------------------------------

/// What went wrong. Each kind carries a default severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// The document could not be parsed at all.
    ParseFailure,
    /// The document parsed but is not a valid label.
    InvalidLabel,
    MissingRequiredField,
    IllegalIdentifier,
    MalformedReference,
    MissingReferenceType,
    MissingReferenceTarget,
    UnmappedReferenceType,
    NoAssociations,
    TitleTooLong,
    UnmatchedReference,
    ChecksumMismatch,
    ChecksumNotListed,
}

impl ProblemKind {
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::ParseFailure
            | Self::InvalidLabel
            | Self::MissingRequiredField
            | Self::IllegalIdentifier
            | Self::MalformedReference
            | Self::MissingReferenceType
            | Self::MissingReferenceTarget
            | Self::UnmatchedReference => Severity::Error,
            Self::UnmappedReferenceType | Self::TitleTooLong | Self::ChecksumMismatch => {
                Severity::Warning
            }
            Self::NoAssociations | Self::ChecksumNotListed => Severity::Info,
        }
    }

    /// Structural kinds force an item to `Skip` regardless of other findings.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::InvalidLabel)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseFailure => "parse_failure",
            Self::InvalidLabel => "invalid_label",
            Self::MissingRequiredField => "missing_required_field",
            Self::IllegalIdentifier => "illegal_identifier",
            Self::MalformedReference => "malformed_reference",
            Self::MissingReferenceType => "missing_reference_type",
            Self::MissingReferenceTarget => "missing_reference_target",
            Self::UnmappedReferenceType => "unmapped_reference_type",
            Self::NoAssociations => "no_associations",
            Self::TitleTooLong => "title_too_long",
            Self::UnmatchedReference => "unmatched_reference",
            Self::ChecksumMismatch => "checksum_mismatch",
            Self::ChecksumNotListed => "checksum_not_listed",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(severity_warning, Severity, Severity::Warning, "warning");
    test_serde_roundtrip!(status_skip, Status, Status::Skip, "SKIP");
    test_serde_roundtrip!(
        kind_unmatched,
        ProblemKind,
        ProblemKind::UnmatchedReference,
        "unmatched_reference"
    );

    #[test]
    fn threshold_gates_by_rank() {
        assert!(Severity::Error.is_within(Severity::Warning));
        assert!(Severity::Warning.is_within(Severity::Warning));
        assert!(!Severity::Info.is_within(Severity::Warning));
        assert!(Severity::Info.is_within(Severity::Info));
        assert!(!Severity::Warning.is_within(Severity::Error));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(" info ".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("severe".parse::<Severity>().unwrap(), Severity::Error);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn only_invalid_label_is_structural() {
        assert!(ProblemKind::InvalidLabel.is_structural());
        assert!(!ProblemKind::ParseFailure.is_structural());
        assert!(!ProblemKind::UnmatchedReference.is_structural());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Status::Fail), "FAIL");
        assert_eq!(format!("{}", ProblemKind::TitleTooLong), "title_too_long");
    }
}

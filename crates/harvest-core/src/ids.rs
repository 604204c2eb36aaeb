//! Logical identifiers (LID) and versioned identifiers (LIDVID).
//!
//! A product is named by its LID; a specific version of it by `LID::VERSION`.
//! The same value type is used for self-identity and for every outbound
//! reference.
//!
//! ## Matching
//!
//! A label's identity is compared against exclusion entries with
//! [`Identifier::covers`]. LIDs must be equal; an entry without a version
//! acts as a wildcard over every version of that LID, while a versioned
//! entry only covers candidates carrying that exact version.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Separator between a LID and its version.
pub const VERSION_SEPARATOR: &str = "::";

/// A LID with an optional version.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Identifier {
    pub lid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Identifier {
    /// An unversioned identifier.
    pub fn new(lid: impl Into<String>) -> Self {
        Self {
            lid: lid.into(),
            version: None,
        }
    }

    /// A versioned identifier.
    pub fn versioned(lid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            lid: lid.into(),
            version: Some(version.into()),
        }
    }

    /// Parse `"LID"` or `"LID::VERSION"`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] for an empty LID, an empty
    /// version after the separator, or more than one separator.
    pub fn parse(token: &str) -> Result<Self, CoreError> {
        let token = token.trim();
        let invalid = |reason: &str| CoreError::InvalidIdentifier {
            value: token.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = token.split(VERSION_SEPARATOR);
        let lid = parts.next().unwrap_or_default();
        if lid.is_empty() {
            return Err(invalid("missing logical identifier"));
        }
        match (parts.next(), parts.next()) {
            (None, _) => Ok(Self::new(lid)),
            (Some(""), _) => Err(invalid("missing version after '::'")),
            (Some(version), None) => Ok(Self::versioned(lid, version)),
            (Some(_), Some(_)) => Err(invalid("more than one '::' separator")),
        }
    }

    /// Parse a token that must carry a version (a `lidvid_reference`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] when the token does not parse
    /// or has no version.
    pub fn parse_versioned(token: &str) -> Result<Self, CoreError> {
        let id = Self::parse(token)?;
        if id.version.is_none() {
            return Err(CoreError::InvalidIdentifier {
                value: token.trim().to_string(),
                reason: "expected a LID-VID reference".to_string(),
            });
        }
        Ok(id)
    }

    #[must_use]
    pub const fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// One-sided match used by exclusion lists: `self` is the entry,
    /// `candidate` the product being admitted.
    #[must_use]
    pub fn covers(&self, candidate: &Self) -> bool {
        if self.lid != candidate.lid {
            return false;
        }
        match &self.version {
            None => true,
            Some(version) => candidate.version.as_deref() == Some(version.as_str()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}{VERSION_SEPARATOR}{version}", self.lid),
            None => f.write_str(&self.lid),
        }
    }
}

impl FromStr for Identifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

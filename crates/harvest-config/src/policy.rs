//! Extraction policy: which object types are recognized and what to pull
//! out of each.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default namespace URI bound to the `pds` prefix.
pub const PDS4_NAMESPACE: &str = "http://pds.nasa.gov/pds4/pds/v1";

fn default_required_fields() -> Vec<String> {
    vec![
        String::from("version_id"),
        String::from("logical_identifier"),
        String::from("object_type"),
    ]
}

fn default_namespaces() -> BTreeMap<String, String> {
    BTreeMap::from([(String::from("pds"), String::from(PDS4_NAMESPACE))])
}

/// One slot extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractionRule {
    /// Path expression evaluated against the label.
    pub path: String,

    /// Slot name; defaults to the matched element's name.
    #[serde(default)]
    pub name: Option<String>,

    /// Attribute on the matched element holding the unit.
    #[serde(default)]
    pub unit_attribute: Option<String>,
}

/// Rules for one recognized object type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectTypeConfig {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<ExtractionRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub object_types: Vec<ObjectTypeConfig>,

    /// Core fields every record must carry.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,

    /// Relationship-type remap table. Empty means no table is configured.
    #[serde(default)]
    pub reference_types: BTreeMap<String, String>,

    /// Identifiers (`LID` or `LID::VERSION`) never admitted as primary members.
    #[serde(default)]
    pub non_primary_members: Vec<String>,

    /// Prefix to namespace URI bindings usable in path expressions.
    #[serde(default = "default_namespaces")]
    pub namespaces: BTreeMap<String, String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            object_types: Vec::new(),
            required_fields: default_required_fields(),
            reference_types: BTreeMap::new(),
            non_primary_members: Vec::new(),
            namespaces: default_namespaces(),
        }
    }
}

//! Settings for the legacy fixed-keyword label dialect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_object_type() -> String {
    String::from("Product_Proxy_PDS3")
}

fn default_lid_prefix() -> String {
    String::from("urn:nasa:pds:")
}

fn default_lid_keywords() -> Vec<String> {
    vec![String::from("DATA_SET_ID"), String::from("PRODUCT_ID")]
}

fn default_title_keyword() -> String {
    String::from("DATA_SET_NAME")
}

fn default_version() -> String {
    String::from("1.0")
}

fn default_required_fields() -> Vec<String> {
    vec![String::from("object_type")]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyConfig {
    /// Object type assigned to every legacy label.
    #[serde(default = "default_object_type")]
    pub object_type: String,

    /// Prefix prepended to the generated logical identifier.
    #[serde(default = "default_lid_prefix")]
    pub lid_prefix: String,

    /// Keywords whose values, joined with `:`, form the identifier.
    #[serde(default = "default_lid_keywords")]
    pub lid_keywords: Vec<String>,

    #[serde(default = "default_title_keyword")]
    pub title_keyword: String,

    /// Version assigned to generated identifiers.
    #[serde(default = "default_version")]
    pub version: String,

    /// Keyword to relationship type; each value becomes a reference.
    #[serde(default)]
    pub reference_keywords: BTreeMap<String, String>,

    /// Core fields a legacy record must carry. Generated identifiers are
    /// optional here since catalogs often lack the keywords they come from.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            object_type: default_object_type(),
            lid_prefix: default_lid_prefix(),
            lid_keywords: default_lid_keywords(),
            title_keyword: default_title_keyword(),
            version: default_version(),
            reference_keywords: BTreeMap::new(),
            required_fields: default_required_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = LegacyConfig::default();
        assert_eq!(config.object_type, "Product_Proxy_PDS3");
        assert_eq!(config.lid_prefix, "urn:nasa:pds:");
        assert_eq!(config.lid_keywords, vec!["DATA_SET_ID", "PRODUCT_ID"]);
        assert_eq!(config.version, "1.0");
        assert!(config.reference_keywords.is_empty());
        assert_eq!(config.required_fields, vec!["object_type"]);
    }
}

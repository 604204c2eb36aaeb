//! Referential-integrity categories.

use serde::{Deserialize, Serialize};

/// An association category and the attribute that identifies its parents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub name: String,
    pub identifier: String,
}

impl CategoryConfig {
    fn new(name: &str, identifier: &str) -> Self {
        Self {
            name: name.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("DATA_SET", "DATA_SET_ID"),
        CategoryConfig::new("INSTRUMENT", "INSTRUMENT_ID"),
        CategoryConfig::new("INSTRUMENT_HOST", "INSTRUMENT_HOST_ID"),
        CategoryConfig::new("MISSION", "MISSION_NAME"),
        CategoryConfig::new("PERSONNEL", "PDS_USER_ID"),
        CategoryConfig::new("PERSONNEL_ELECTRONIC_MAIL", "ELECTRONIC_MAIL_ID"),
        CategoryConfig::new("REFERENCE", "REFERENCE_KEY_ID"),
        CategoryConfig::new("TARGET", "TARGET_NAME"),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegrityConfig {
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

impl IntegrityConfig {
    pub fn identifier_for(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(category))
            .map(|c| c.identifier.as_str())
    }
}

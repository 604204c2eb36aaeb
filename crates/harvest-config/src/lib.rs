//! # harvest-config
//!
//! Layered configuration loading for the archive harvester using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`HARVEST_*` prefix, `__` as separator)
//! 2. An explicit config file, or `./harvest.toml` when present
//! 3. User-level `~/.config/harvest/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HARVEST_REPORT__LEVEL` -> `report.level`,
//! `HARVEST_CRAWL__PERSIST` -> `crawl.persist`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use harvest_config::HarvestConfig;
//!
//! let config = HarvestConfig::load(None).expect("config");
//! for root in &config.crawl.roots {
//!     println!("crawling {}", root.display());
//! }
//! ```

mod crawl;
mod error;
mod integrity;
mod legacy;
mod policy;
mod report;

pub use crawl::{CrawlConfig, DirectoryFilterConfig, FileFilterConfig};
pub use error::ConfigError;
pub use integrity::{CategoryConfig, IntegrityConfig};
pub use legacy::LegacyConfig;
pub use policy::{ExtractionRule, ObjectTypeConfig, PDS4_NAMESPACE, PolicyConfig};
pub use report::{ChecksumConfig, DaemonConfig, ReportConfig, ReportFormat};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file picked up when no explicit file is given.
pub const LOCAL_CONFIG_FILE: &str = "harvest.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HarvestConfig {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub legacy: LegacyConfig,
    #[serde(default)]
    pub integrity: IntegrityConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub checksums: ChecksumConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl HarvestConfig {
    /// Load and validate configuration from all sources.
    ///
    /// `explicit` replaces the project-local `harvest.toml` and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(ConfigError::MissingFile(path.display().to_string()));
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Explicit or project-local config
        let local_path = explicit.map_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("HARVEST_").split("__"))
    }

    /// Structural checks figment cannot express.
    ///
    /// Path expressions and wildcards are checked when the policy and the
    /// filters are compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, object_type) in self.policy.object_types.iter().enumerate() {
            if object_type.name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("policy.object_types[{index}].name"),
                    "must not be empty",
                ));
            }
            for (rule_index, rule) in object_type.rules.iter().enumerate() {
                if rule.path.trim().is_empty() {
                    return Err(ConfigError::invalid(
                        format!("policy.object_types[{index}].rules[{rule_index}].path"),
                        "must not be empty",
                    ));
                }
            }
        }

        for (index, category) in self.integrity.categories.iter().enumerate() {
            if category.name.trim().is_empty() || category.identifier.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("integrity.categories[{index}]"),
                    "name and identifier must not be empty",
                ));
            }
        }

        if self.legacy.lid_keywords.is_empty() {
            return Err(ConfigError::invalid(
                "legacy.lid_keywords",
                "at least one keyword is required",
            ));
        }

        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("harvest").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HarvestConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.crawl.has_targets());
        assert_eq!(config.integrity.categories.len(), 8);
    }

    #[test]
    fn empty_rule_path_is_rejected() {
        let mut config = HarvestConfig::default();
        config.policy.object_types.push(ObjectTypeConfig {
            name: "Product_Observational".into(),
            rules: vec![ExtractionRule {
                path: "  ".into(),
                name: None,
                unit_attribute: None,
            }],
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rules[0].path"));
    }

    #[test]
    fn empty_lid_keywords_are_rejected() {
        let mut config = HarvestConfig::default();
        config.legacy.lid_keywords.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = HarvestConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn explicit_file_outside_working_directory_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[report]\nlevel = \"warning\"\n").unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.report.level, harvest_core::Severity::Warning);
    }
}

//! Report, checksum-manifest and daemon settings.

use harvest_core::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const fn default_level() -> Severity {
    Severity::Info
}

/// Layout of the emitted report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Minimum severity counted and printed.
    #[serde(default = "default_level")]
    pub level: Severity,

    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: ReportFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChecksumConfig {
    /// Checksum manifest to compare declared file checksums against.
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Base for relative manifest paths; defaults to the manifest's directory.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
}

impl ChecksumConfig {
    pub fn resolved_base(&self) -> Option<PathBuf> {
        if let Some(base) = &self.base_path {
            return Some(base.clone());
        }
        self.manifest
            .as_ref()
            .and_then(|m| m.parent())
            .map(std::path::Path::to_path_buf)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// Seconds between cycle starts. Zero runs once.
    #[serde(default)]
    pub interval_secs: u64,
}

impl DaemonConfig {
    pub const fn interval(&self) -> Option<Duration> {
        if self.interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.interval_secs))
        }
    }
}

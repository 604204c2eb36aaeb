use anyhow::Context;
use harvest_config::HarvestConfig;

use crate::cli::GlobalFlags;

/// Load the layered configuration. Any failure here is fatal.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<HarvestConfig> {
    let config = HarvestConfig::load(flags.config.as_deref()).context("failed to load configuration")?;
    if !config.crawl.has_targets() {
        tracing::warn!("no crawl roots configured; nothing will be harvested");
    }
    Ok(config)
}

use std::path::Path;

use anyhow::Context;
use harvest_crawl::ChecksumManifest;

use crate::cli::root_commands::ManifestArgs;

/// Handle `harvest manifest`.
pub fn handle(args: &ManifestArgs) -> anyhow::Result<()> {
    let base = args
        .base
        .clone()
        .or_else(|| args.file.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let manifest = ChecksumManifest::read(&args.file, &base)
        .with_context(|| format!("failed to read manifest {}", args.file.display()))?;

    for (path, checksum) in manifest.iter() {
        println!("{checksum}  {}", path.display());
    }
    tracing::info!(entries = manifest.len(), "manifest read");
    Ok(())
}

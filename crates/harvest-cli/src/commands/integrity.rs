use anyhow::bail;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::IntegrityArgs;
use crate::pipeline::Harvester;

/// Handle `harvest integrity`.
pub fn handle(args: &IntegrityArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        bail!("'{}' is not a directory", args.dir.display());
    }
    let config = bootstrap::load_config(flags)?;
    let harvester =
        Harvester::for_catalog(config, flags.config.clone(), &args.dir, args.report.clone())?;
    let mut state = harvester.load_state()?;
    harvester.run_cycle(&mut state)?;
    Ok(())
}

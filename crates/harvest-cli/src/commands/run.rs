use std::time::Duration;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::daemon;
use crate::pipeline::{CycleOutputs, Harvester};

/// Handle `harvest run`.
pub async fn handle(args: &RunArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = bootstrap::load_config(flags)?;
    let interval = args
        .daemon
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .or_else(|| config.daemon.interval());

    let harvester = Harvester::new(
        config,
        flags.config.clone(),
        CycleOutputs {
            records: args.records.clone(),
            report: args.report.clone(),
        },
    )?;
    let mut state = harvester.load_state()?;

    match interval {
        Some(interval) => daemon::run(harvester, state, interval).await,
        None => {
            harvester.run_cycle(&mut state)?;
            Ok(())
        }
    }
}

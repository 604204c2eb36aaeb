//! Fixed-interval repetition of the harvest cycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::pipeline::{CycleState, Harvester};

/// Run cycles every `interval` until Ctrl-C.
///
/// One cycle runs at a time; a cycle that overruns the interval delays the
/// next tick. The cycle state is handed to each cycle and taken back after it.
/// A failed cycle is logged and the loop carries on.
pub async fn run(harvester: Harvester, state: CycleState, interval: Duration) -> anyhow::Result<()> {
    let harvester = Arc::new(harvester);
    let mut state = state;
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(interval_secs = interval.as_secs(), "harvest daemon started");
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                info!(cycles = cycle, "interrupt received, no further cycles scheduled");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        cycle += 1;
        let worker = Arc::clone(&harvester);
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = worker.run_cycle(&mut state);
            (state, result)
        })
        .await
        .context("harvest cycle panicked")?;
        state = returned;

        match result {
            Ok(summary) => info!(
                cycle,
                passed = summary.totals.passed,
                failed = summary.totals.failed,
                skipped = summary.totals.skipped,
                "harvest cycle finished"
            ),
            Err(err) => error!(cycle, error = %format!("{err:#}"), "harvest cycle failed"),
        }
    }
}

//! Tick loop host
//!
//! Polls a [`SnapshotProvider`] once per period, runs the pilot and hands the
//! decision to a [`CommandSink`]. Ticks never overlap: a slow tick makes the
//! loop skip the periods it missed instead of bursting to catch up.

use std::time::Duration;

use anyhow::Context;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::bot::pilot::{Memory, Pilot, Signal};
use crate::command::CommandSink;
use crate::world::provider::SnapshotProvider;

/// What happened over a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Periods elapsed
    pub ticks: u64,
    /// Ticks with a live agent that produced a destination
    pub decisions: u64,
    /// Ticks with no snapshot or no live agent
    pub idle_ticks: u64,
    pub commands: usize,
    pub splits: u64,
    pub no_safe_direction: u64,
    /// Memory after the last tick, if any snapshot was seen
    pub memory: Option<Memory>,
}

/// Drive `pilot` until the provider is exhausted or `max_ticks` periods have elapsed
pub async fn run<P, S>(
    pilot: &Pilot,
    provider: &mut P,
    sink: &mut S,
    max_ticks: Option<u64>,
) -> anyhow::Result<RunSummary>
where
    P: SnapshotProvider,
    S: CommandSink,
{
    let period = Duration::from_millis(pilot.config().tick_ms.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut summary = RunSummary::default();
    info!("Tick loop starting (period: {}ms)", period.as_millis());

    loop {
        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            debug!("Tick limit reached");
            break;
        }
        if provider.is_exhausted() {
            debug!("Snapshot source exhausted");
            break;
        }

        interval.tick().await;
        summary.ticks += 1;

        let Some(snapshot) = provider.next_snapshot() else {
            summary.idle_ticks += 1;
            continue;
        };

        let memory = summary
            .memory
            .take()
            .unwrap_or_else(|| Memory::new(snapshot.now_ms));
        let (memory, decision) = pilot.tick(memory, &snapshot);
        summary.memory = Some(memory);

        if decision.is_idle() {
            summary.idle_ticks += 1;
            continue;
        }

        summary.decisions += 1;
        summary.splits += u64::from(decision.splits);
        summary.no_safe_direction += decision
            .signals
            .iter()
            .filter(|s| **s == Signal::NoSafeDirection)
            .count() as u64;
        summary.commands += decision
            .dispatch(sink)
            .with_context(|| format!("dispatching tick at {}ms", snapshot.now_ms))?;
    }

    info!(
        "Tick loop stopped after {} ticks ({} decisions, {} commands)",
        summary.ticks, summary.decisions, summary.commands
    );
    Ok(summary)
}

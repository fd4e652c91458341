//! Shortest-Job-First (non-preemptive).

use log::debug;

use super::{PolicyKind, SchedulingPolicy, SimulationContext, Variant};
use crate::error::InvariantViolation;

/// Shortest-Job-First, non-preemptive.
///
/// The working list is sorted by `(arrival_time, burst_time, pid)`. Each
/// time the processor is free one arrived process runs to completion;
/// with nothing arrived the clock advances by one idle unit.
///
/// # Selection
/// - [`Variant::Legacy`]: an arrived process with `arrival_time == 0` is
///   taken immediately regardless of its burst; otherwise the arrived
///   process with the strictly smallest burst (first in sorted order on
///   ties). Zero-arrival jobs therefore always run before later arrivals,
///   even shorter ones.
/// - [`Variant::Classic`]: the arrived process with the smallest
///   `(burst_time, arrival_time, pid)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sjf {
    variant: Variant,
}

impl Sjf {
    /// Creates SJF with the given selection rule.
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// Selection rule in use.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn select(&self, ctx: &SimulationContext) -> Option<usize> {
        match self.variant {
            Variant::Legacy => select_legacy(ctx),
            Variant::Classic => ctx.select_min_by_key(|p| (p.burst_time, p.arrival_time, p.pid)),
        }
    }
}

fn select_legacy(ctx: &SimulationContext) -> Option<usize> {
    let mut selected = None;
    let mut min_burst = i64::MAX;
    for index in ctx.ready_indices() {
        let process = &ctx.processes[index];
        if process.arrival_time == 0 {
            return Some(index);
        }
        if process.burst_time < min_burst {
            min_burst = process.burst_time;
            selected = Some(index);
        }
    }
    selected
}

impl SchedulingPolicy for Sjf {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Sjf
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        ctx.processes.sort_by_key(|p| (p.arrival_time, p.burst_time, p.pid));

        while !ctx.all_finished() {
            ctx.step()?;
            match self.select(ctx) {
                Some(index) => {
                    let process = &ctx.processes[index];
                    let (pid, burst) = (process.pid, process.remaining_time);
                    debug!("t={}: dispatch P{pid} (burst {burst})", ctx.clock);
                    ctx.run(index, burst);
                }
                None => ctx.idle(),
            }
        }
        Ok(())
    }
}

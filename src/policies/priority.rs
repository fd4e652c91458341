//! Priority policies.
//!
//! Lower priority value = higher priority. Both policies require every
//! process to carry a priority; the simulator rejects input without one
//! before either policy runs.

use log::debug;

use super::{
    run_in_order, run_preemptive, PolicyKind, SchedulingPolicy, SimulationContext, Variant,
};
use crate::error::InvariantViolation;
use crate::models::Process;

/// Sort key for a validated process. Unset priorities sort last.
fn priority_of(process: &Process) -> i64 {
    process.priority.unwrap_or(i64::MAX)
}

/// Non-preemptive Priority.
///
/// # Selection
/// - [`Variant::Legacy`]: sort by `(arrival_time, priority, pid)` and run
///   like FCFS. Priority only orders processes that arrive together.
/// - [`Variant::Classic`]: whenever the processor frees up, the arrived
///   process with the smallest `(priority, arrival_time, pid)` runs to
///   completion. Idle gaps are a clock jump, as in FCFS.
///
/// The working list is sorted by `(arrival_time, priority, pid)` in both
/// variants, which is also the detail-table order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonPreemptivePriority {
    variant: Variant,
}

impl NonPreemptivePriority {
    /// Creates the policy with the given selection rule.
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// Selection rule in use.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn execute_classic(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        while !ctx.all_finished() {
            ctx.step()?;
            let index = match ctx.select_min_by_key(|p| (priority_of(p), p.arrival_time, p.pid)) {
                Some(index) => index,
                None => {
                    let next_arrival = ctx
                        .processes
                        .iter()
                        .filter(|p| !p.is_finished())
                        .map(|p| p.arrival_time)
                        .min();
                    if let Some(t) = next_arrival {
                        ctx.advance_to(t);
                    }
                    continue;
                }
            };
            let process = &ctx.processes[index];
            let (pid, burst) = (process.pid, process.remaining_time);
            debug!("t={}: dispatch P{pid} to completion", ctx.clock);
            ctx.run(index, burst);
        }
        Ok(())
    }
}

impl SchedulingPolicy for NonPreemptivePriority {
    fn kind(&self) -> PolicyKind {
        PolicyKind::NonPreemptivePriority
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        ctx.processes.sort_by_key(|p| (p.arrival_time, priority_of(p), p.pid));
        match self.variant {
            Variant::Legacy => run_in_order(ctx),
            Variant::Classic => self.execute_classic(ctx),
        }
    }
}

/// Preemptive Priority.
///
/// Unit-stepped like SRTF, choosing the smallest priority value each
/// unit; exact ties go to the process listed first in the input. A newly
/// arrived higher-priority process preempts immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreemptivePriority;

impl SchedulingPolicy for PreemptivePriority {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PreemptivePriority
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        run_preemptive(ctx, priority_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::{completion, segments, simulate, waiting};

    #[test]
    fn test_npp_equal_arrival_smallest_priority_first() {
        let rows = [(1, 0, 3, Some(3)), (2, 0, 2, Some(1)), (3, 0, 1, Some(2))];
        for variant in [Variant::Legacy, Variant::Classic] {
            let ctx = simulate(&NonPreemptivePriority::new(variant), &rows);
            assert_eq!(segments(&ctx), vec![(2, 0, 2), (3, 2, 3), (1, 3, 6)]);
        }
    }

    #[test]
    fn test_npp_legacy_arrival_dominates() {
        // P3 arrives later with better priority than P1, legacy still runs P1 first
        let rows = [(1, 0, 3, Some(3)), (2, 0, 2, Some(1)), (3, 1, 1, Some(2))];
        let ctx = simulate(&NonPreemptivePriority::new(Variant::Legacy), &rows);
        assert_eq!(segments(&ctx), vec![(2, 0, 2), (1, 2, 5), (3, 5, 6)]);
        assert_eq!(waiting(&ctx, 3), 4);
    }

    #[test]
    fn test_npp_classic_priority_among_arrived() {
        let rows = [(1, 0, 3, Some(3)), (2, 0, 2, Some(1)), (3, 1, 1, Some(2))];
        let ctx = simulate(&NonPreemptivePriority::new(Variant::Classic), &rows);
        assert_eq!(segments(&ctx), vec![(2, 0, 2), (3, 2, 3), (1, 3, 6)]);
        assert_eq!(waiting(&ctx, 3), 1);
    }

    #[test]
    fn test_npp_no_preemption() {
        // P2 arrives with top priority while P1 runs; it must wait
        let rows = [(1, 0, 4, Some(5)), (2, 1, 1, Some(0))];
        for variant in [Variant::Legacy, Variant::Classic] {
            let ctx = simulate(&NonPreemptivePriority::new(variant), &rows);
            assert_eq!(segments(&ctx), vec![(1, 0, 4), (2, 4, 5)]);
        }
    }

    #[test]
    fn test_npp_classic_gap_is_a_jump() {
        let rows = [(1, 3, 2, Some(1))];
        let ctx = simulate(&NonPreemptivePriority::new(Variant::Classic), &rows);
        assert_eq!(segments(&ctx), vec![(1, 3, 5)]);
        assert_eq!(ctx.timeline.idle_tokens(), 0);
    }

    #[test]
    fn test_pp_preempts_at_arrival() {
        let rows = [(1, 0, 5, Some(3)), (2, 2, 2, Some(1))];
        let ctx = simulate(&PreemptivePriority, &rows);
        assert_eq!(segments(&ctx), vec![(1, 0, 2), (2, 2, 4), (1, 4, 7)]);
        assert_eq!(ctx.processes[1].start_time, Some(2));
        assert_eq!(completion(&ctx, 1), 7);
        assert_eq!(waiting(&ctx, 1), 2);
        assert_eq!(waiting(&ctx, 2), 0);
    }

    #[test]
    fn test_pp_equal_arrival() {
        let rows = [(1, 0, 2, Some(4)), (2, 0, 2, Some(2))];
        let ctx = simulate(&PreemptivePriority, &rows);
        assert_eq!(segments(&ctx), vec![(2, 0, 2), (1, 2, 4)]);
    }

    #[test]
    fn test_pp_tie_goes_to_input_order() {
        let rows = [(2, 0, 2, Some(1)), (1, 0, 2, Some(1))];
        let ctx = simulate(&PreemptivePriority, &rows);
        assert_eq!(segments(&ctx), vec![(2, 0, 2), (1, 2, 4)]);
    }

    #[test]
    fn test_pp_busy_units_match_bursts() {
        let rows = [(1, 1, 3, Some(2)), (2, 6, 2, Some(1))];
        let ctx = simulate(&PreemptivePriority, &rows);
        assert_eq!(ctx.timeline.busy_time(), 5);
        assert_eq!(ctx.timeline.idle_tokens() as i64, ctx.timeline.end_time() - 5);
    }
}

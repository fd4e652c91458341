//! First-Come-First-Served.

use super::{run_in_order, PolicyKind, SchedulingPolicy, SimulationContext};
use crate::error::InvariantViolation;

/// First-Come-First-Served, non-preemptive.
///
/// Processes run to completion in `(arrival_time, pid)` order. Idle gaps
/// are a clock jump, not idle tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl SchedulingPolicy for Fcfs {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fcfs
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        ctx.processes.sort_by_key(|p| (p.arrival_time, p.pid));
        run_in_order(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::{segments, simulate, waiting};

    #[test]
    fn test_fcfs_basic() {
        let ctx = simulate(&Fcfs, &[(1, 0, 5, None), (2, 2, 3, None)]);
        assert_eq!(segments(&ctx), vec![(1, 0, 5), (2, 5, 8)]);
        assert_eq!(waiting(&ctx, 1), 0);
        assert_eq!(waiting(&ctx, 2), 3);
    }

    #[test]
    fn test_fcfs_pid_breaks_arrival_tie() {
        let ctx = simulate(&Fcfs, &[(2, 0, 1, None), (1, 0, 4, None)]);
        assert_eq!(segments(&ctx), vec![(1, 0, 4), (2, 4, 5)]);
    }

    #[test]
    fn test_fcfs_gap_is_a_jump() {
        let ctx = simulate(&Fcfs, &[(1, 0, 2, None), (2, 6, 1, None)]);
        assert_eq!(segments(&ctx), vec![(1, 0, 2), (2, 6, 7)]);
        assert_eq!(ctx.timeline.idle_tokens(), 0);
        assert_eq!(waiting(&ctx, 2), 0);
    }

    #[test]
    fn test_fcfs_sorted_order_kept() {
        let ctx = simulate(&Fcfs, &[(1, 4, 1, None), (2, 1, 1, None)]);
        let order: Vec<u32> = ctx.processes.iter().map(|p| p.pid).collect();
        assert_eq!(order, vec![2, 1]);
    }
}

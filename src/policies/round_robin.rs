//! Round-Robin with a fixed time quantum.

use log::debug;
use std::collections::VecDeque;

use super::{PolicyKind, SchedulingPolicy, SimulationContext, Variant};
use crate::error::InvariantViolation;
use crate::validation::{validate_quantum, ValidationError};

/// Round-Robin, preemptive at quantum boundaries.
///
/// Each dispatch runs `min(remaining, quantum)` units and records one
/// timeline token. With nothing ready the clock advances by one idle unit.
///
/// # Selection
/// - [`Variant::Legacy`]: the pending list starts in input order. Each
///   dispatch takes the **first arrived** entry of the list; a process
///   that still has work after its slice goes to the back. A process
///   that arrives late can therefore overtake ones that were re-queued
///   before it arrived.
/// - [`Variant::Classic`]: a FIFO ready queue fed in `(arrival_time, pid)`
///   order. Processes arriving during a slice are queued before the
///   preempted process is re-queued.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: i64,
    variant: Variant,
}

impl RoundRobin {
    /// Creates Round-Robin with the given quantum (legacy selection).
    ///
    /// # Errors
    /// `InvalidQuantum` when `quantum <= 0`.
    pub fn new(quantum: i64) -> Result<Self, ValidationError> {
        Self::from_option(Some(quantum))
    }

    /// Creates Round-Robin from an optional quantum.
    ///
    /// # Errors
    /// `MissingQuantum` for `None`, `InvalidQuantum` when `<= 0`.
    pub fn from_option(quantum: Option<i64>) -> Result<Self, ValidationError> {
        Ok(Self {
            quantum: validate_quantum(quantum)?,
            variant: Variant::Legacy,
        })
    }

    /// Sets the selection rule.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Time quantum.
    pub fn quantum(&self) -> i64 {
        self.quantum
    }

    /// Selection rule in use.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn dispatch(&self, ctx: &mut SimulationContext, index: usize) {
        let pid = ctx.processes[index].pid;
        debug!(
            "t={}: dispatch P{pid} (remaining {})",
            ctx.clock, ctx.processes[index].remaining_time
        );
        ctx.run(index, self.quantum);
    }

    fn execute_legacy(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        let mut pending: VecDeque<usize> = (0..ctx.processes.len()).collect();

        while !pending.is_empty() {
            ctx.step()?;
            let now = ctx.clock;
            let position = pending
                .iter()
                .position(|&i| ctx.processes[i].has_arrived(now));

            match position.and_then(|pos| pending.remove(pos)) {
                Some(index) => {
                    self.dispatch(ctx, index);
                    if !ctx.processes[index].is_finished() {
                        pending.push_back(index);
                    }
                }
                None => ctx.idle(),
            }
        }
        Ok(())
    }

    fn execute_classic(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        let mut arrivals: Vec<usize> = (0..ctx.processes.len()).collect();
        arrivals.sort_by_key(|&i| (ctx.processes[i].arrival_time, ctx.processes[i].pid));
        let mut arrivals = arrivals.into_iter().peekable();
        let mut ready: VecDeque<usize> = VecDeque::new();

        loop {
            while let Some(&next) = arrivals.peek() {
                if !ctx.processes[next].has_arrived(ctx.clock) {
                    break;
                }
                ready.push_back(next);
                arrivals.next();
            }

            if ready.is_empty() && arrivals.peek().is_none() {
                break;
            }
            ctx.step()?;

            let Some(index) = ready.pop_front() else {
                ctx.idle();
                continue;
            };

            self.dispatch(ctx, index);

            // Arrivals during the slice go ahead of the preempted process
            while let Some(&next) = arrivals.peek() {
                if !ctx.processes[next].has_arrived(ctx.clock) {
                    break;
                }
                ready.push_back(next);
                arrivals.next();
            }
            if !ctx.processes[index].is_finished() {
                ready.push_back(index);
            }
        }
        Ok(())
    }
}

impl SchedulingPolicy for RoundRobin {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RoundRobin
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        match self.variant {
            Variant::Legacy => self.execute_legacy(ctx),
            Variant::Classic => self.execute_classic(ctx),
        }
    }
}

impl TryFrom<i64> for RoundRobin {
    type Error = ValidationError;

    fn try_from(quantum: i64) -> Result<Self, Self::Error> {
        Self::new(quantum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::{completion, segments, simulate, waiting};
    use crate::validation::ValidationErrorKind;

    fn rr(quantum: i64, variant: Variant) -> RoundRobin {
        RoundRobin::new(quantum).unwrap().with_variant(variant)
    }

    #[test]
    fn test_rr_quantum_two_golden() {
        let rows = [(1, 0, 5, None), (2, 1, 3, None)];
        for variant in [Variant::Legacy, Variant::Classic] {
            let ctx = simulate(&rr(2, variant), &rows);
            assert_eq!(
                segments(&ctx),
                vec![(1, 0, 2), (2, 2, 4), (1, 4, 6), (2, 6, 7), (1, 7, 8)]
            );
            assert_eq!(completion(&ctx, 1), 8);
            assert_eq!(completion(&ctx, 2), 7);
            assert_eq!(waiting(&ctx, 1), 3);
            assert_eq!(waiting(&ctx, 2), 3);
        }
    }

    #[test]
    fn test_rr_one_token_per_dispatch() {
        let ctx = simulate(&rr(2, Variant::Legacy), &[(1, 0, 5, None)]);
        // 2 + 2 + 1
        assert_eq!(ctx.timeline.len(), 3);
        assert_eq!(ctx.timeline.to_string(), "P1 | P1 | P1");
    }

    #[test]
    fn test_rr_variants_diverge_on_late_arrival() {
        let rows = [(1, 0, 4, None), (2, 0, 4, None), (3, 3, 2, None)];

        // Legacy: P3 sits before the re-queued P1 in the pending list
        let legacy = simulate(&rr(2, Variant::Legacy), &rows);
        assert_eq!(
            segments(&legacy),
            vec![(1, 0, 2), (2, 2, 4), (3, 4, 6), (1, 6, 8), (2, 8, 10)]
        );

        // Classic: P3 joins the queue behind P1 when it arrives
        let classic = simulate(&rr(2, Variant::Classic), &rows);
        assert_eq!(
            segments(&classic),
            vec![(1, 0, 2), (2, 2, 4), (1, 4, 6), (3, 6, 8), (2, 8, 10)]
        );
    }

    #[test]
    fn test_rr_idle_until_arrival() {
        for variant in [Variant::Legacy, Variant::Classic] {
            let ctx = simulate(&rr(3, variant), &[(1, 2, 2, None), (2, 6, 1, None)]);
            assert_eq!(ctx.timeline.to_string(), "idle | idle | P1 | idle | idle | P2");
            assert_eq!(completion(&ctx, 2), 7);
        }
    }

    #[test]
    fn test_rr_exact_quantum_completes() {
        let ctx = simulate(&rr(2, Variant::Legacy), &[(1, 0, 2, None), (2, 0, 2, None)]);
        assert_eq!(segments(&ctx), vec![(1, 0, 2), (2, 2, 4)]);
    }

    #[test]
    fn test_rr_quantum_validation() {
        assert_eq!(
            RoundRobin::new(0).unwrap_err().kind,
            ValidationErrorKind::InvalidQuantum
        );
        assert_eq!(
            RoundRobin::from_option(None).unwrap_err().kind,
            ValidationErrorKind::MissingQuantum
        );
        assert_eq!(RoundRobin::try_from(4).unwrap().quantum(), 4);
    }
}

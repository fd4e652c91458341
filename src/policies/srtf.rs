//! Shortest-Remaining-Time-First (preemptive).

use super::{run_preemptive, PolicyKind, SchedulingPolicy, SimulationContext};
use crate::error::InvariantViolation;

/// Shortest-Remaining-Time-First, preemptive.
///
/// Simulates one time unit at a time. Each unit the arrived, unfinished
/// process with the least remaining time runs; exact ties go to the
/// process listed first in the input. A newly arrived shorter job
/// preempts the running one at its arrival instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Srtf;

impl SchedulingPolicy for Srtf {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Srtf
    }

    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
        run_preemptive(ctx, |p| p.remaining_time)
    }
}

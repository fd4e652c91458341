//! Timeline (Gantt chart) model.
//!
//! A timeline is the ordered record of who held the processor. Each
//! [`Slice`] is one token: a unit step for preemptive policies, a whole
//! dispatch for run-to-completion and round-robin policies, or a single
//! idle unit. Gaps between slices are allowed (FCFS jumps the clock to
//! the next arrival without emitting idle tokens).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Pid;

/// What occupies the processor during a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// The process with this pid ran.
    Process(Pid),
    /// No process was eligible.
    Idle,
}

impl Occupant {
    /// Pid of the running process, `None` when idle.
    pub fn pid(&self) -> Option<Pid> {
        match self {
            Occupant::Process(pid) => Some(*pid),
            Occupant::Idle => None,
        }
    }

    /// Whether this is an idle token.
    pub fn is_idle(&self) -> bool {
        matches!(self, Occupant::Idle)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Process(pid) => write!(f, "P{pid}"),
            Occupant::Idle => f.write_str("idle"),
        }
    }
}

/// One timeline token over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Who held the processor.
    pub occupant: Occupant,
    /// Start time (inclusive).
    pub start: i64,
    /// End time (exclusive).
    pub end: i64,
}

impl Slice {
    /// Creates a slice.
    pub fn new(occupant: Occupant, start: i64, end: i64) -> Self {
        Self {
            occupant,
            start,
            end,
        }
    }

    /// Length in time units.
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Ordered sequence of slices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    slices: Vec<Slice>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token for `pid` over `[start, end)`.
    pub fn push_run(&mut self, pid: Pid, start: i64, end: i64) {
        self.slices.push(Slice::new(Occupant::Process(pid), start, end));
    }

    /// Appends an idle token over `[start, end)`.
    pub fn push_idle(&mut self, start: i64, end: i64) {
        self.slices.push(Slice::new(Occupant::Idle, start, end));
    }

    /// All tokens in order.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether no token was recorded.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// End of the last token (0 when empty).
    pub fn end_time(&self) -> i64 {
        self.slices.last().map(|s| s.end).unwrap_or(0)
    }

    /// Total time covered by process tokens.
    pub fn busy_time(&self) -> i64 {
        self.slices
            .iter()
            .filter(|s| !s.occupant.is_idle())
            .map(Slice::duration)
            .sum()
    }

    /// Total time covered by idle tokens.
    ///
    /// Implicit gaps (clock jumps without tokens) are not counted.
    pub fn idle_time(&self) -> i64 {
        self.slices
            .iter()
            .filter(|s| s.occupant.is_idle())
            .map(Slice::duration)
            .sum()
    }

    /// Number of idle tokens.
    pub fn idle_tokens(&self) -> usize {
        self.slices.iter().filter(|s| s.occupant.is_idle()).count()
    }

    /// Time units during which `pid` held the processor.
    pub fn busy_time_of(&self, pid: Pid) -> i64 {
        self.slices
            .iter()
            .filter(|s| s.occupant == Occupant::Process(pid))
            .map(Slice::duration)
            .sum()
    }

    /// Gantt segments: adjacent, contiguous slices with the same occupant
    /// merged into one.
    pub fn segments(&self) -> Vec<Slice> {
        let mut merged: Vec<Slice> = Vec::with_capacity(self.slices.len());
        for slice in &self.slices {
            match merged.last_mut() {
                Some(last) if last.occupant == slice.occupant && last.end == slice.start => {
                    last.end = slice.end;
                }
                _ => merged.push(*slice),
            }
        }
        merged
    }

    /// Number of process-to-different-process hand-overs.
    ///
    /// Idle stretches between two runs of the same process do not count.
    pub fn context_switches(&self) -> usize {
        let pids: Vec<Pid> = self
            .segments()
            .iter()
            .filter_map(|s| s.occupant.pid())
            .collect();
        pids.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slice) in self.slices.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", slice.occupant)?;
        }
        Ok(())
    }
}

//! Scheduling policies.
//!
//! Six uniprocessor policies, each a [`SchedulingPolicy`] that drives a
//! [`SimulationContext`] until every process has finished:
//!
//! | Policy | Preemptive | Selection |
//! |--------|-----------|-----------|
//! | [`Fcfs`] | no | earliest arrival |
//! | [`Sjf`] | no | shortest burst |
//! | [`Srtf`] | yes | shortest remaining time |
//! | [`RoundRobin`] | yes (quantum) | cyclic |
//! | [`NonPreemptivePriority`] | no | smallest priority value |
//! | [`PreemptivePriority`] | yes | smallest priority value |
//!
//! # Variants
//!
//! SJF, Round-Robin and Non-preemptive Priority come in two flavors.
//! [`Variant::Legacy`] reproduces the historical selection rules exactly;
//! [`Variant::Classic`] is the textbook algorithm. Neither replaces the
//! other.
//!
//! # Tie-breaking
//!
//! Preemptive policies break exact ties in favor of the process that
//! comes first in the caller's input order.
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

mod context;
mod fcfs;
mod priority;
mod round_robin;
mod sjf;
mod srtf;

pub use context::SimulationContext;
pub use fcfs::Fcfs;
pub use priority::{NonPreemptivePriority, PreemptivePriority};
pub use round_robin::RoundRobin;
pub use sjf::Sjf;
pub use srtf::Srtf;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::error::InvariantViolation;
use crate::models::Process;
use crate::validation::ValidationError;

/// A CPU scheduling policy.
///
/// Implementations are stateless apart from their parameters, so one
/// instance can drive any number of runs, concurrently if needed.
pub trait SchedulingPolicy: Send + Sync + Debug {
    /// Which policy this is.
    fn kind(&self) -> PolicyKind;

    /// Short name (e.g., "FCFS", "RR").
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Long description.
    fn description(&self) -> &'static str {
        self.kind().description()
    }

    /// Whether every process must carry a priority.
    fn requires_priority(&self) -> bool {
        self.kind().requires_priority()
    }

    /// Whether the outcome carries a per-process detail table.
    fn reports_table(&self) -> bool {
        self.kind().reports_table()
    }

    /// Simulates until every process in `ctx` has finished.
    ///
    /// Must call [`SimulationContext::step`] once per loop iteration.
    fn execute(&self, ctx: &mut SimulationContext) -> Result<(), InvariantViolation>;
}

/// The six built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// First-Come-First-Served.
    Fcfs,
    /// Shortest-Job-First, non-preemptive.
    Sjf,
    /// Shortest-Remaining-Time-First, preemptive.
    Srtf,
    /// Round-Robin with a fixed quantum.
    RoundRobin,
    /// Priority, non-preemptive.
    NonPreemptivePriority,
    /// Priority, preemptive.
    PreemptivePriority,
}

impl PolicyKind {
    /// All policies in presentation order.
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fcfs,
        PolicyKind::Sjf,
        PolicyKind::Srtf,
        PolicyKind::RoundRobin,
        PolicyKind::NonPreemptivePriority,
        PolicyKind::PreemptivePriority,
    ];

    /// Short name.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Fcfs => "FCFS",
            PolicyKind::Sjf => "SJF",
            PolicyKind::Srtf => "SRTF",
            PolicyKind::RoundRobin => "RR",
            PolicyKind::NonPreemptivePriority => "NPP",
            PolicyKind::PreemptivePriority => "PP",
        }
    }

    /// Long description.
    pub fn description(&self) -> &'static str {
        match self {
            PolicyKind::Fcfs => "First-Come-First-Served",
            PolicyKind::Sjf => "Shortest-Job-First (non-preemptive)",
            PolicyKind::Srtf => "Shortest-Remaining-Time-First (preemptive)",
            PolicyKind::RoundRobin => "Round-Robin",
            PolicyKind::NonPreemptivePriority => "Non-preemptive Priority",
            PolicyKind::PreemptivePriority => "Preemptive Priority",
        }
    }

    /// Whether every process must carry a priority.
    pub fn requires_priority(&self) -> bool {
        matches!(
            self,
            PolicyKind::NonPreemptivePriority | PolicyKind::PreemptivePriority
        )
    }

    /// Whether a quantum is required.
    pub fn requires_quantum(&self) -> bool {
        matches!(self, PolicyKind::RoundRobin)
    }

    /// Whether the outcome carries a per-process detail table.
    pub fn reports_table(&self) -> bool {
        matches!(
            self,
            PolicyKind::Fcfs | PolicyKind::Sjf | PolicyKind::NonPreemptivePriority
        )
    }

    /// Whether the policy accepts a [`Variant`].
    pub fn has_variants(&self) -> bool {
        matches!(
            self,
            PolicyKind::Sjf | PolicyKind::RoundRobin | PolicyKind::NonPreemptivePriority
        )
    }

    /// Builds the policy.
    ///
    /// `quantum` is validated for Round-Robin and ignored otherwise;
    /// `variant` is ignored by policies without variants.
    pub fn build(
        &self,
        quantum: Option<i64>,
        variant: Variant,
    ) -> Result<Box<dyn SchedulingPolicy>, ValidationError> {
        if quantum.is_some() && !self.requires_quantum() {
            debug!("{}: ignoring quantum", self.name());
        }
        let policy: Box<dyn SchedulingPolicy> = match self {
            PolicyKind::Fcfs => Box::new(Fcfs),
            PolicyKind::Sjf => Box::new(Sjf::new(variant)),
            PolicyKind::Srtf => Box::new(Srtf),
            PolicyKind::RoundRobin => Box::new(RoundRobin::from_option(quantum)?.with_variant(variant)),
            PolicyKind::NonPreemptivePriority => Box::new(NonPreemptivePriority::new(variant)),
            PolicyKind::PreemptivePriority => Box::new(PreemptivePriority),
        };
        Ok(policy)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fcfs" | "fifo" => Ok(PolicyKind::Fcfs),
            "sjf" => Ok(PolicyKind::Sjf),
            "srtf" => Ok(PolicyKind::Srtf),
            "rr" | "round-robin" => Ok(PolicyKind::RoundRobin),
            "npp" | "non-preemptive-priority" => Ok(PolicyKind::NonPreemptivePriority),
            "pp" | "preemptive-priority" | "priority" => Ok(PolicyKind::PreemptivePriority),
            other => Err(format!(
                "unknown policy '{other}' (expected fcfs, sjf, srtf, rr, npp or pp)"
            )),
        }
    }
}

/// Selection-rule flavor for SJF, Round-Robin and Non-preemptive Priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Historical selection rules, kept for result parity.
    #[default]
    Legacy,
    /// Textbook selection rules.
    Classic,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Legacy => f.write_str("legacy"),
            Variant::Classic => f.write_str("classic"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Variant::Legacy),
            "classic" | "textbook" => Ok(Variant::Classic),
            other => Err(format!("unknown variant '{other}' (expected legacy or classic)")),
        }
    }
}

/// Runs every process to completion in the current working order.
///
/// When the processor frees up before the next process has arrived, the
/// clock jumps to that arrival without idle tokens.
pub(crate) fn run_in_order(ctx: &mut SimulationContext) -> Result<(), InvariantViolation> {
    for index in 0..ctx.processes.len() {
        ctx.step()?;
        let process = &ctx.processes[index];
        let (pid, arrival, burst) = (process.pid, process.arrival_time, process.remaining_time);
        ctx.advance_to(arrival);
        debug!("t={}: dispatch P{pid} to completion", ctx.clock);
        ctx.run(index, burst);
    }
    Ok(())
}

/// Unit-stepped preemptive loop.
///
/// Every unit, the ready process with the smallest `key` runs for one
/// unit (first in working order on ties); an empty ready set yields one
/// idle unit.
pub(crate) fn run_preemptive<K: Ord>(
    ctx: &mut SimulationContext,
    key: impl Fn(&Process) -> K,
) -> Result<(), InvariantViolation> {
    let mut running = None;
    while !ctx.all_finished() {
        ctx.step()?;
        match ctx.select_min_by_key(&key) {
            Some(index) => {
                let pid = ctx.processes[index].pid;
                if running != Some(pid) {
                    debug!("t={}: switch to P{pid}", ctx.clock);
                    running = Some(pid);
                }
                ctx.run(index, 1);
            }
            None => {
                running = None;
                ctx.idle();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{Occupant, Slice};

    /// Builds a context from `(pid, arrival, burst, priority)` tuples.
    pub fn context(rows: &[(u32, i64, i64, Option<i64>)]) -> SimulationContext {
        SimulationContext::new(
            rows.iter()
                .map(|&(pid, arrival, burst, priority)| Process::new(pid, arrival, burst, priority))
                .collect(),
        )
    }

    /// Runs `policy` on `rows` and returns the finished context.
    pub fn simulate(
        policy: &dyn SchedulingPolicy,
        rows: &[(u32, i64, i64, Option<i64>)],
    ) -> SimulationContext {
        let mut ctx = context(rows);
        policy.execute(&mut ctx).unwrap();
        assert!(ctx.all_finished());
        ctx
    }

    /// Merged Gantt segments as `(pid, start, end)`, pid 0 for idle.
    pub fn segments(ctx: &SimulationContext) -> Vec<(u32, i64, i64)> {
        ctx.timeline
            .segments()
            .iter()
            .map(|s: &Slice| match s.occupant {
                Occupant::Process(pid) => (pid, s.start, s.end),
                Occupant::Idle => (0, s.start, s.end),
            })
            .collect()
    }

    /// Waiting time of `pid`.
    pub fn waiting(ctx: &SimulationContext, pid: u32) -> i64 {
        ctx.processes
            .iter()
            .find(|p| p.pid == pid)
            .and_then(|p| p.waiting_time)
            .unwrap()
    }

    /// Completion time of `pid`.
    pub fn completion(ctx: &SimulationContext, pid: u32) -> i64 {
        ctx.processes
            .iter()
            .find(|p| p.pid == pid)
            .and_then(|p| p.completion_time)
            .unwrap()
    }
}

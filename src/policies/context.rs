//! Simulation context shared by all policies.

use log::trace;

use crate::error::{InvariantViolation, InvariantViolationKind};
use crate::models::{Process, Timeline};

/// Mutable state of one simulation run.
///
/// Holds the clock, the private working records and the timeline being
/// built. Policies drive it through [`run`](Self::run),
/// [`idle`](Self::idle) and [`advance_to`](Self::advance_to), and call
/// [`step`](Self::step) once per loop iteration so a runaway policy is
/// stopped by the step budget instead of spinning forever.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    /// Current simulation time.
    pub clock: i64,
    /// Working records. Policies may reorder them.
    pub processes: Vec<Process>,
    /// Timeline recorded so far.
    pub timeline: Timeline,
    steps: u64,
    step_budget: u64,
}

impl SimulationContext {
    /// Creates a context at time 0 with the default step budget.
    ///
    /// The budget is `latest arrival + total burst + process count + 1`,
    /// which bounds the loop iterations of every built-in policy.
    pub fn new(processes: Vec<Process>) -> Self {
        let latest_arrival = processes.iter().map(|p| p.arrival_time).max().unwrap_or(0);
        let total_burst = processes
            .iter()
            .fold(0i64, |acc, p| acc.saturating_add(p.remaining_time.max(0)));
        let budget = latest_arrival
            .max(0)
            .saturating_add(total_burst)
            .saturating_add(processes.len() as i64)
            .saturating_add(1);
        Self {
            clock: 0,
            processes,
            timeline: Timeline::new(),
            steps: 0,
            step_budget: budget as u64,
        }
    }

    /// Overrides the step budget.
    pub fn with_step_budget(mut self, budget: u64) -> Self {
        self.step_budget = budget;
        self
    }

    /// Iterations consumed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Counts one loop iteration against the budget.
    pub fn step(&mut self) -> Result<(), InvariantViolation> {
        self.steps += 1;
        if self.steps > self.step_budget {
            return Err(InvariantViolation::new(
                InvariantViolationKind::NonTermination,
                format!(
                    "step budget of {} exhausted at t={} with {} unfinished process(es)",
                    self.step_budget,
                    self.clock,
                    self.unfinished_count()
                ),
            ));
        }
        Ok(())
    }

    /// Whether every process has finished.
    pub fn all_finished(&self) -> bool {
        self.processes.iter().all(Process::is_finished)
    }

    /// Number of processes still owing work.
    pub fn unfinished_count(&self) -> usize {
        self.processes.iter().filter(|p| !p.is_finished()).count()
    }

    /// Indices of processes that have arrived and still owe work,
    /// in working order.
    pub fn ready_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let now = self.clock;
        self.processes
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.is_ready(now))
            .map(|(i, _)| i)
    }

    /// Index of the ready process with the smallest key.
    ///
    /// Ties go to the earliest index.
    pub fn select_min_by_key<K: Ord>(&self, key: impl Fn(&Process) -> K) -> Option<usize> {
        self.ready_indices().min_by_key(|&i| key(&self.processes[i]))
    }

    /// Runs process `index` for up to `units` starting at the current
    /// clock, records one timeline token, and advances the clock.
    ///
    /// Returns the number of units executed.
    pub fn run(&mut self, index: usize, units: i64) -> i64 {
        let start = self.clock;
        let process = &mut self.processes[index];
        let executed = process.execute(start, units);
        if executed > 0 {
            let pid = process.pid;
            self.timeline.push_run(pid, start, start + executed);
            self.clock += executed;
            trace!("t={start}: P{pid} ran {executed} unit(s)");
        }
        executed
    }

    /// Records one idle unit and advances the clock by one.
    pub fn idle(&mut self) {
        trace!("t={}: idle", self.clock);
        self.timeline.push_idle(self.clock, self.clock + 1);
        self.clock += 1;
    }

    /// Moves the clock forward to `t` without recording idle tokens.
    pub fn advance_to(&mut self, t: i64) {
        if t > self.clock {
            self.clock = t;
        }
    }

    /// Consumes the context, returning the records and the timeline.
    pub fn into_parts(self) -> (Vec<Process>, Timeline) {
        (self.processes, self.timeline)
    }
}

//! Process (job) model.
//!
//! A [`ProcessSpec`] is the caller-owned, immutable description of a job.
//! A [`Process`] is the private working record a policy mutates while it
//! simulates; every run builds fresh records from the specs, so the same
//! input can be replayed under several policies without cross-talk.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2

use serde::{Deserialize, Serialize};

/// Process identifier, unique within one simulation run.
pub type Pid = u32;

/// Input description of a process.
///
/// Fields are signed so that out-of-range values can be represented and
/// rejected by [`validate_processes`](crate::validation::validate_processes)
/// instead of being silently clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Explicit identifier. `None` = assigned in arrival order.
    #[serde(default)]
    pub pid: Option<i64>,
    /// Time at which the process becomes eligible to run.
    pub arrival_time: i64,
    /// Total processor time required.
    pub burst_time: i64,
    /// Scheduling priority (lower = scheduled first). `None` = unset.
    #[serde(default)]
    pub priority: Option<i64>,
}

impl ProcessSpec {
    /// Creates a spec with an auto-assigned pid and no priority.
    pub fn new(arrival_time: i64, burst_time: i64) -> Self {
        Self {
            pid: None,
            arrival_time,
            burst_time,
            priority: None,
        }
    }

    /// Sets an explicit pid.
    pub fn with_pid(mut self, pid: i64) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Working record of a process during and after a simulation.
///
/// Derived fields (`start_time`, `completion_time`, `waiting_time`,
/// `turnaround_time`) start unset and are written once each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Process identifier.
    pub pid: Pid,
    /// Arrival time.
    pub arrival_time: i64,
    /// Total execution time. Never modified.
    pub burst_time: i64,
    /// Execution time still owed. `0 <= remaining_time <= burst_time`.
    pub remaining_time: i64,
    /// Priority (lower = scheduled first).
    pub priority: Option<i64>,
    /// First instant the process held the processor.
    pub start_time: Option<i64>,
    /// Instant the last unit of work finished.
    pub completion_time: Option<i64>,
    /// `turnaround_time - burst_time`.
    pub waiting_time: Option<i64>,
    /// `completion_time - arrival_time`.
    pub turnaround_time: Option<i64>,
}

impl Process {
    /// Creates a fresh record with all derived fields unset.
    pub fn new(pid: Pid, arrival_time: i64, burst_time: i64, priority: Option<i64>) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            priority,
            start_time: None,
            completion_time: None,
            waiting_time: None,
            turnaround_time: None,
        }
    }

    /// Whether the process is eligible at time `t`.
    #[inline]
    pub fn has_arrived(&self, t: i64) -> bool {
        self.arrival_time <= t
    }

    /// Whether all work has been done.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining_time == 0
    }

    /// Whether the process is eligible and still owes work at time `t`.
    #[inline]
    pub fn is_ready(&self, t: i64) -> bool {
        self.has_arrived(t) && !self.is_finished()
    }

    /// Response time: `start_time - arrival_time`.
    pub fn response_time(&self) -> Option<i64> {
        self.start_time.map(|s| s - self.arrival_time)
    }

    /// Executes `units` of work starting at `now`.
    ///
    /// Records `start_time` on the first call. Finalizes the process when
    /// the remaining time reaches zero. `units` is clamped to the
    /// remaining time; returns the number of units actually executed.
    pub(crate) fn execute(&mut self, now: i64, units: i64) -> i64 {
        let units = units.min(self.remaining_time).max(0);
        if units == 0 {
            return 0;
        }
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.remaining_time -= units;
        if self.remaining_time == 0 {
            self.finalize(now + units);
        }
        units
    }

    fn finalize(&mut self, completion_time: i64) {
        let turnaround = completion_time - self.arrival_time;
        self.completion_time = Some(completion_time);
        self.turnaround_time = Some(turnaround);
        self.waiting_time = Some(turnaround - self.burst_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = ProcessSpec::new(3, 7).with_pid(4).with_priority(2);
        assert_eq!(spec.pid, Some(4));
        assert_eq!(spec.arrival_time, 3);
        assert_eq!(spec.burst_time, 7);
        assert_eq!(spec.priority, Some(2));
    }

    #[test]
    fn test_new_process_unset() {
        let p = Process::new(1, 0, 5, None);
        assert_eq!(p.remaining_time, 5);
        assert!(p.start_time.is_none());
        assert!(p.completion_time.is_none());
        assert!(p.waiting_time.is_none());
        assert!(!p.is_finished());
    }

    #[test]
    fn test_execute_in_pieces() {
        let mut p = Process::new(1, 2, 3, None);
        assert_eq!(p.execute(4, 1), 1);
        assert_eq!(p.start_time, Some(4));
        assert_eq!(p.remaining_time, 2);

        // Start time is not overwritten by later dispatches
        assert_eq!(p.execute(9, 5), 2);
        assert_eq!(p.start_time, Some(4));
        assert!(p.is_finished());
        assert_eq!(p.completion_time, Some(11));
        assert_eq!(p.turnaround_time, Some(9)); // 11 - 2
        assert_eq!(p.waiting_time, Some(6)); // 9 - 3
        assert_eq!(p.response_time(), Some(2));
    }

    #[test]
    fn test_execute_finished_is_noop() {
        let mut p = Process::new(1, 0, 1, None);
        p.execute(0, 1);
        assert_eq!(p.execute(5, 1), 0);
        assert_eq!(p.completion_time, Some(1));
    }

    #[test]
    fn test_readiness() {
        let p = Process::new(1, 5, 2, None);
        assert!(!p.is_ready(4));
        assert!(p.is_ready(5));
    }

    #[test]
    fn test_spec_deserialize_optional_fields() {
        let spec: ProcessSpec =
            serde_json::from_str(r#"{"arrival_time": 1, "burst_time": 4}"#).unwrap();
        assert_eq!(spec, ProcessSpec::new(1, 4));
    }
}

//! Schedule quality metrics.
//!
//! Computes the standard CPU-scheduling performance indicators from the
//! finalized process records and the timeline of a run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Avg Waiting Time | mean(turnaround - burst) |
//! | Avg Turnaround Time | mean(completion - arrival) |
//! | Avg Response Time | mean(first dispatch - arrival) |
//! | Makespan | Latest completion time |
//! | Busy Time | Units the processor ran a process |
//! | Idle Time | makespan - busy time |
//! | CPU Utilization | busy time / makespan |
//! | Throughput | processes / makespan |
//! | Context Switches | Process-to-process hand-overs |
//!
//! Averages are plain means of integers and are never rounded here.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2:
//! Scheduling Criteria

use serde::{Deserialize, Serialize};

use crate::models::{Process, Timeline};

/// Run performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Number of completed processes.
    pub completed: usize,
    /// Mean waiting time.
    pub avg_waiting_time: f64,
    /// Mean turnaround time.
    pub avg_turnaround_time: f64,
    /// Mean response time.
    pub avg_response_time: f64,
    /// Latest completion time.
    pub makespan: i64,
    /// Time the processor spent running processes.
    pub busy_time: i64,
    /// Time the processor spent idle before the makespan.
    pub idle_time: i64,
    /// Fraction of the makespan spent busy (0.0..1.0).
    pub cpu_utilization: f64,
    /// Completed processes per time unit.
    pub throughput: f64,
    /// Number of process-to-process hand-overs.
    pub context_switches: usize,
}

impl ScheduleMetrics {
    /// Computes metrics from finalized records and their timeline.
    ///
    /// Processes without a completion time are left out of the averages.
    pub fn calculate(processes: &[Process], timeline: &Timeline) -> Self {
        let finished: Vec<&Process> = processes
            .iter()
            .filter(|p| p.completion_time.is_some())
            .collect();
        let completed = finished.len();
        let makespan = finished
            .iter()
            .filter_map(|p| p.completion_time)
            .max()
            .unwrap_or(0);

        let busy_time = timeline.busy_time();
        let mean = |value: fn(&Process) -> Option<i64>| {
            average(finished.iter().map(|&p| value(p).unwrap_or(0))).unwrap_or(0.0)
        };
        let per_makespan = |value: f64| {
            if makespan <= 0 {
                0.0
            } else {
                value / makespan as f64
            }
        };

        Self {
            completed,
            avg_waiting_time: mean(|p| p.waiting_time),
            avg_turnaround_time: mean(|p| p.turnaround_time),
            avg_response_time: mean(Process::response_time),
            makespan,
            busy_time,
            idle_time: (makespan - busy_time).max(0),
            cpu_utilization: per_makespan(busy_time as f64),
            throughput: per_makespan(completed as f64),
            context_switches: timeline.context_switches(),
        }
    }
}

/// Arithmetic mean of integer values. `None` for an empty input.
pub fn average(values: impl IntoIterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0i64, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(pid: u32, arrival: i64, burst: i64, start: i64, completion: i64) -> Process {
        let mut p = Process::new(pid, arrival, burst, None);
        p.execute(start, burst - 1);
        p.execute(completion - 1, 1);
        p
    }

    #[test]
    fn test_metrics_fcfs_example() {
        let processes = vec![finished(1, 0, 5, 0, 5), finished(2, 2, 3, 5, 8)];
        let mut timeline = Timeline::new();
        timeline.push_run(1, 0, 5);
        timeline.push_run(2, 5, 8);

        let m = ScheduleMetrics::calculate(&processes, &timeline);
        assert_eq!(m.completed, 2);
        assert!((m.avg_waiting_time - 1.5).abs() < 1e-10);
        assert!((m.avg_turnaround_time - 5.5).abs() < 1e-10);
        assert!((m.avg_response_time - 1.5).abs() < 1e-10); // (0 + 3) / 2
        assert_eq!(m.makespan, 8);
        assert_eq!(m.busy_time, 8);
        assert_eq!(m.idle_time, 0);
        assert!((m.cpu_utilization - 1.0).abs() < 1e-10);
        assert!((m.throughput - 0.25).abs() < 1e-10);
        assert_eq!(m.context_switches, 1);
    }

    #[test]
    fn test_metrics_idle_gap() {
        let processes = vec![finished(1, 0, 2, 0, 2), finished(2, 6, 2, 6, 8)];
        let mut timeline = Timeline::new();
        timeline.push_run(1, 0, 2);
        timeline.push_run(2, 6, 8);

        let m = ScheduleMetrics::calculate(&processes, &timeline);
        // Implicit gap counts as idle against the makespan
        assert_eq!(m.idle_time, 4);
        assert!((m.cpu_utilization - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_metrics_skip_unfinished() {
        let processes = vec![finished(1, 0, 2, 0, 2), Process::new(2, 0, 3, None)];
        let m = ScheduleMetrics::calculate(&processes, &Timeline::new());
        assert_eq!(m.completed, 1);
        assert!((m.avg_turnaround_time - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_metrics_empty() {
        let m = ScheduleMetrics::calculate(&[], &Timeline::new());
        assert_eq!(m.completed, 0);
        assert_eq!(m.makespan, 0);
        assert!((m.avg_waiting_time - 0.0).abs() < 1e-10);
        assert!((m.cpu_utilization - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_average() {
        assert_eq!(average([]), None);
        assert_eq!(average([0, 3]), Some(1.5));
        assert_eq!(average(vec![5, 6]), Some(5.5));
    }
}

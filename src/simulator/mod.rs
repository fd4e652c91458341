//! Simulation engine.
//!
//! Validates a process set, runs one policy over private copies of it,
//! verifies the result and computes metrics.
//!
//! The free functions below are one-call entry points per policy with
//! the default configuration. Use [`Simulator`] for a process cap, or
//! [`Simulator::compare`] to replay the same input under every policy.
//!
//! # Example
//!
//! ```
//! use cpu_schedule::models::ProcessSpec;
//! use cpu_schedule::simulator;
//!
//! let specs = vec![
//!     ProcessSpec::new(0, 8),
//!     ProcessSpec::new(1, 4),
//!     ProcessSpec::new(2, 9),
//!     ProcessSpec::new(3, 5),
//! ];
//! let outcome = simulator::srtf(&specs).unwrap();
//! assert!((outcome.average_waiting_time() - 6.5).abs() < 1e-10);
//! ```

mod engine;
mod metrics;

pub use engine::{DetailRow, SimulationConfig, SimulationOutcome, SimulationRequest, Simulator};
pub use metrics::{average, ScheduleMetrics};

use crate::error::SimulationError;
use crate::models::ProcessSpec;
use crate::policies::{
    Fcfs, NonPreemptivePriority, PolicyKind, PreemptivePriority, Sjf, Srtf, Variant,
};

/// First-Come-First-Served.
pub fn fcfs(specs: &[ProcessSpec]) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new().run(specs, &Fcfs)
}

/// Shortest-Job-First (non-preemptive).
pub fn sjf(specs: &[ProcessSpec], variant: Variant) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new().run(specs, &Sjf::new(variant))
}

/// Shortest-Remaining-Time-First (preemptive).
pub fn srtf(specs: &[ProcessSpec]) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new().run(specs, &Srtf)
}

/// Round-Robin with the given quantum.
///
/// A non-positive quantum is reported together with any process errors.
pub fn round_robin(
    specs: &[ProcessSpec],
    quantum: i64,
    variant: Variant,
) -> Result<SimulationOutcome, SimulationError> {
    let request = SimulationRequest::new(specs.to_vec(), PolicyKind::RoundRobin)
        .with_quantum(quantum)
        .with_variant(variant);
    Simulator::new().run_request(&request)
}

/// Non-preemptive Priority. Every process needs a priority.
pub fn non_preemptive_priority(
    specs: &[ProcessSpec],
    variant: Variant,
) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new().run(specs, &NonPreemptivePriority::new(variant))
}

/// Preemptive Priority. Every process needs a priority.
pub fn preemptive_priority(specs: &[ProcessSpec]) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new().run(specs, &PreemptivePriority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    fn textbook_specs() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new(0, 8),
            ProcessSpec::new(1, 4),
            ProcessSpec::new(2, 9),
            ProcessSpec::new(3, 5),
        ]
    }

    #[test]
    fn test_entry_points_agree_with_simulator() {
        let specs = textbook_specs();
        assert_eq!(fcfs(&specs).unwrap(), Simulator::new().run(&specs, &Fcfs).unwrap());
        assert_eq!(srtf(&specs).unwrap(), Simulator::new().run(&specs, &Srtf).unwrap());

        let classic = sjf(&specs, Variant::Classic).unwrap();
        assert_eq!(classic.policy, PolicyKind::Sjf);
        assert!(classic.detail_table.is_some());
    }

    #[test]
    fn test_round_robin_entry_point() {
        let specs = vec![ProcessSpec::new(0, 5), ProcessSpec::new(1, 3)];
        let outcome = round_robin(&specs, 2, Variant::Legacy).unwrap();
        assert!((outcome.average_waiting_time() - 3.0).abs() < 1e-10);

        let err = round_robin(&[], 0, Variant::Legacy).unwrap_err();
        assert!(err.has_kind(ValidationErrorKind::InvalidQuantum));
        assert!(err.has_kind(ValidationErrorKind::EmptyProcessSet));
    }

    #[test]
    fn test_priority_entry_points() {
        let specs = vec![
            ProcessSpec::new(0, 5).with_priority(3),
            ProcessSpec::new(2, 2).with_priority(1),
        ];
        let pp = preemptive_priority(&specs).unwrap();
        assert_eq!(pp.timeline.segments().len(), 3);
        assert!(pp.detail_table.is_none());

        let npp = non_preemptive_priority(&specs, Variant::Legacy).unwrap();
        assert_eq!(npp.timeline.to_string(), "P1 | P2");

        let err = preemptive_priority(&textbook_specs()).unwrap_err();
        assert!(err.has_kind(ValidationErrorKind::MissingPriority));
    }
}

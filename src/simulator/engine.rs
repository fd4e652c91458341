//! Simulation driver.
//!
//! # Algorithm
//!
//! 1. Validate the process set against the policy's requirements.
//! 2. Build fresh working records (pids resolved) from the specs.
//! 3. Let the policy drive a [`SimulationContext`] to completion.
//! 4. Verify every finished record against the timing identities.
//! 5. Compute metrics and assemble the outcome.
//!
//! Caller data is only ever borrowed immutably, so one spec slice can be
//! replayed under any number of policies.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::ScheduleMetrics;
use crate::error::{InvariantViolation, InvariantViolationKind, SimulationError};
use crate::models::{Pid, Process, ProcessSpec, Timeline};
use crate::policies::{PolicyKind, SchedulingPolicy, SimulationContext, Variant};
use crate::validation::{assign_pids, validate_processes, Requirements, ValidationError};

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Upper bound on the number of processes. `None` = unbounded.
    #[serde(default)]
    pub max_processes: Option<usize>,
}

impl SimulationConfig {
    /// Creates the default configuration (no process cap).
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of processes per run.
    pub fn with_max_processes(mut self, max: usize) -> Self {
        self.max_processes = Some(max);
        self
    }
}

/// Input container for one simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Processes to schedule.
    pub processes: Vec<ProcessSpec>,
    /// Policy to run.
    pub policy: PolicyKind,
    /// Round-Robin time quantum.
    #[serde(default)]
    pub quantum: Option<i64>,
    /// Selection-rule flavor for policies that have one.
    #[serde(default)]
    pub variant: Variant,
    /// Engine configuration.
    #[serde(default)]
    pub config: SimulationConfig,
}

impl SimulationRequest {
    /// Creates a request with default variant and configuration.
    pub fn new(processes: Vec<ProcessSpec>, policy: PolicyKind) -> Self {
        Self {
            processes,
            policy,
            quantum: None,
            variant: Variant::default(),
            config: SimulationConfig::default(),
        }
    }

    /// Sets the Round-Robin quantum.
    pub fn with_quantum(mut self, quantum: i64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Sets the selection-rule flavor.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }
}

/// One row of the per-process detail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    /// Process identifier.
    pub pid: Pid,
    /// Arrival time.
    pub arrival_time: i64,
    /// Burst time.
    pub burst_time: i64,
    /// Waiting time.
    pub waiting_time: i64,
    /// Turnaround time.
    pub turnaround_time: i64,
}

/// Result of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Policy that produced this outcome.
    pub policy: PolicyKind,
    /// Finalized records, in the policy's working order.
    pub processes: Vec<Process>,
    /// Execution timeline.
    pub timeline: Timeline,
    /// Aggregate metrics.
    pub metrics: ScheduleMetrics,
    /// Per-process table (FCFS, SJF and Non-preemptive Priority only).
    pub detail_table: Option<Vec<DetailRow>>,
}

impl SimulationOutcome {
    /// Mean waiting time.
    pub fn average_waiting_time(&self) -> f64 {
        self.metrics.avg_waiting_time
    }

    /// Mean turnaround time.
    pub fn average_turnaround_time(&self) -> f64 {
        self.metrics.avg_turnaround_time
    }

    /// Finalized record of `pid`.
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}

/// Runs scheduling policies over process sets.
///
/// # Example
///
/// ```
/// use cpu_schedule::models::ProcessSpec;
/// use cpu_schedule::policies::Fcfs;
/// use cpu_schedule::simulator::Simulator;
///
/// let specs = vec![ProcessSpec::new(0, 5), ProcessSpec::new(2, 3)];
/// let outcome = Simulator::new().run(&specs, &Fcfs).unwrap();
///
/// assert!((outcome.average_waiting_time() - 1.5).abs() < 1e-10);
/// assert!((outcome.average_turnaround_time() - 5.5).abs() < 1e-10);
/// assert_eq!(outcome.timeline.to_string(), "P1 | P2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    /// Creates a simulator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with the given configuration.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs `policy` over `specs`.
    ///
    /// # Errors
    /// - [`SimulationError::InvalidInput`] if validation fails; nothing runs.
    /// - [`SimulationError::InvariantViolation`] if the policy fails to
    ///   terminate or produces an impossible schedule.
    pub fn run(
        &self,
        specs: &[ProcessSpec],
        policy: &dyn SchedulingPolicy,
    ) -> Result<SimulationOutcome, SimulationError> {
        let requirements = self.requirements(policy.requires_priority());
        validate_processes(specs, &requirements)?;
        self.execute(specs, policy)
    }

    /// Builds the requested policy and runs it.
    ///
    /// Policy-parameter and process errors are reported together.
    pub fn run_request(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationOutcome, SimulationError> {
        let simulator = Simulator::with_config(request.config.clone());
        let mut errors: Vec<ValidationError> = Vec::new();

        let policy = match request.policy.build(request.quantum, request.variant) {
            Ok(policy) => Some(policy),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let requirements = simulator.requirements(request.policy.requires_priority());
        if let Err(mut process_errors) = validate_processes(&request.processes, &requirements) {
            errors.append(&mut process_errors);
        }

        match policy {
            Some(policy) if errors.is_empty() => simulator.execute(&request.processes, policy.as_ref()),
            _ => Err(SimulationError::InvalidInput(errors)),
        }
    }

    /// Runs every applicable policy over the same specs.
    ///
    /// Priority policies are skipped when any spec lacks a priority, and
    /// Round-Robin when `quantum` is `None`. Each run works on its own
    /// records.
    pub fn compare(
        &self,
        specs: &[ProcessSpec],
        quantum: Option<i64>,
        variant: Variant,
    ) -> Vec<(PolicyKind, Result<SimulationOutcome, SimulationError>)> {
        let has_priorities = specs.iter().all(|s| s.priority.is_some());
        PolicyKind::ALL
            .into_iter()
            .filter(|kind| !kind.requires_priority() || has_priorities)
            .filter(|kind| !kind.requires_quantum() || quantum.is_some())
            .map(|kind| {
                let result = kind
                    .build(quantum, variant)
                    .map_err(|e| SimulationError::InvalidInput(vec![e]))
                    .and_then(|policy| self.run(specs, policy.as_ref()));
                (kind, result)
            })
            .collect()
    }

    fn requirements(&self, priority: bool) -> Requirements {
        Requirements::new()
            .with_priority(priority)
            .with_max_processes(self.config.max_processes)
    }

    fn execute(
        &self,
        specs: &[ProcessSpec],
        policy: &dyn SchedulingPolicy,
    ) -> Result<SimulationOutcome, SimulationError> {
        let processes: Vec<Process> = assign_pids(specs)
            .into_iter()
            .zip(specs)
            .map(|(pid, spec)| Process::new(pid, spec.arrival_time, spec.burst_time, spec.priority))
            .collect();

        info!(
            "{}: simulating {} process(es)",
            policy.name(),
            processes.len()
        );

        let mut ctx = SimulationContext::new(processes);
        policy.execute(&mut ctx)?;
        debug!("{}: finished at t={} after {} step(s)", policy.name(), ctx.clock, ctx.steps());

        let (processes, timeline) = ctx.into_parts();
        verify(&processes)?;

        let metrics = ScheduleMetrics::calculate(&processes, &timeline);
        let detail_table = policy.reports_table().then(|| detail_rows(&processes));

        info!(
            "{}: avg waiting {}, avg turnaround {}",
            policy.name(),
            metrics.avg_waiting_time,
            metrics.avg_turnaround_time
        );

        Ok(SimulationOutcome {
            policy: policy.kind(),
            processes,
            timeline,
            metrics,
            detail_table,
        })
    }
}

/// Checks every record against the timing identities.
fn verify(processes: &[Process]) -> Result<(), InvariantViolation> {
    for p in processes {
        let completion = match (p.is_finished(), p.completion_time, p.start_time) {
            (true, Some(completion), Some(_)) => completion,
            _ => {
                return Err(InvariantViolation::new(
                    InvariantViolationKind::IncompleteProcess,
                    format!("P{} did not finish (remaining {})", p.pid, p.remaining_time),
                ))
            }
        };

        let turnaround = completion - p.arrival_time;
        let waiting = turnaround - p.burst_time;
        if waiting < 0 {
            return Err(InvariantViolation::new(
                InvariantViolationKind::NegativeWaitingTime,
                format!("P{} has waiting time {waiting}", p.pid),
            ));
        }
        if p.turnaround_time != Some(turnaround) || p.waiting_time != Some(waiting) {
            return Err(InvariantViolation::new(
                InvariantViolationKind::InconsistentTiming,
                format!(
                    "P{} stores turnaround {:?} / waiting {:?}, expected {turnaround} / {waiting}",
                    p.pid, p.turnaround_time, p.waiting_time
                ),
            ));
        }
    }
    Ok(())
}

fn detail_rows(processes: &[Process]) -> Vec<DetailRow> {
    processes
        .iter()
        .map(|p| DetailRow {
            pid: p.pid,
            arrival_time: p.arrival_time,
            burst_time: p.burst_time,
            waiting_time: p.waiting_time.unwrap_or(0),
            turnaround_time: p.turnaround_time.unwrap_or(0),
        })
        .collect()
}

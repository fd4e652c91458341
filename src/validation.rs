//! Input validation for simulation runs.
//!
//! Checks the process set and the policy parameters before any
//! simulation starts. Detects:
//! - Empty process sets and oversized ones
//! - Negative arrival times and non-positive bursts
//! - Times past [`MAX_TIME`]
//! - Non-positive or duplicate pids
//! - Missing priorities for priority policies
//! - Missing or non-positive Round-Robin quanta
//!
//! Every problem is reported; nothing is defaulted or skipped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::{Pid, ProcessSpec};

/// Largest time any run may reach: latest arrival plus total burst must
/// not exceed it.
pub const MAX_TIME: i64 = 1 << 40;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// No processes were supplied.
    EmptyProcessSet,
    /// More processes than the configured cap.
    TooManyProcesses,
    /// A burst time is zero or negative.
    NonPositiveBurst,
    /// An arrival time is negative.
    NegativeArrival,
    /// A time, or the run's total length, exceeds [`MAX_TIME`].
    ValueOutOfRange,
    /// An explicit pid is zero, negative or out of range.
    InvalidPid,
    /// Two processes share the same pid.
    DuplicatePid,
    /// A priority policy was selected but a process has no priority.
    MissingPriority,
    /// Round-Robin was selected without a quantum.
    MissingQuantum,
    /// The Round-Robin quantum is zero or negative.
    InvalidQuantum,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// What the selected policy and configuration demand of the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Every process must carry a priority.
    pub priority: bool,
    /// Upper bound on the number of processes. `None` = unbounded.
    pub max_processes: Option<usize>,
}

impl Requirements {
    /// Requirements with no priority demand and no cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Demands a priority on every process.
    pub fn with_priority(mut self, required: bool) -> Self {
        self.priority = required;
        self
    }

    /// Caps the number of processes.
    pub fn with_max_processes(mut self, max: Option<usize>) -> Self {
        self.max_processes = max;
        self
    }
}

/// Validates a process set.
///
/// Checks:
/// 1. At least one process
/// 2. No more than `max_processes` processes
/// 3. Every arrival time is `>= 0`
/// 4. Every burst time is `> 0`
/// 5. Every explicit pid is a positive `u32`
/// 6. No two explicit pids are equal
/// 7. Every process has a priority when the policy needs one
/// 8. Latest arrival plus total burst stays within [`MAX_TIME`]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_processes(specs: &[ProcessSpec], requirements: &Requirements) -> ValidationResult {
    let mut errors = Vec::new();

    if specs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyProcessSet,
            "No processes to schedule",
        ));
    }

    if let Some(max) = requirements.max_processes {
        if specs.len() > max {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManyProcesses,
                format!("{} processes given, at most {max} allowed", specs.len()),
            ));
        }
    }

    let mut seen_pids = HashSet::new();
    for (index, spec) in specs.iter().enumerate() {
        let label = describe(index, spec);

        if spec.arrival_time < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeArrival,
                format!("{label}: arrival time {} is negative", spec.arrival_time),
            ));
        }

        if spec.burst_time <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveBurst,
                format!("{label}: burst time {} is not positive", spec.burst_time),
            ));
        }

        if let Some(pid) = spec.pid {
            if pid <= 0 || Pid::try_from(pid).is_err() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPid,
                    format!("{label}: pid must be a positive 32-bit integer"),
                ));
            } else if !seen_pids.insert(pid) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicatePid,
                    format!("Duplicate pid: {pid}"),
                ));
            }
        }

        if requirements.priority && spec.priority.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingPriority,
                format!("{label}: priority is required by the selected policy"),
            ));
        }
    }

    if let Some(horizon) = horizon(specs) {
        if horizon > MAX_TIME {
            errors.push(ValidationError::new(
                ValidationErrorKind::ValueOutOfRange,
                format!("Latest arrival plus total burst is {horizon}, at most {MAX_TIME} allowed"),
            ));
        }
    } else {
        errors.push(ValidationError::new(
            ValidationErrorKind::ValueOutOfRange,
            format!("Latest arrival plus total burst exceeds {MAX_TIME}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Latest arrival plus total burst over the well-formed specs, `None` on
/// overflow.
fn horizon(specs: &[ProcessSpec]) -> Option<i64> {
    let latest = specs.iter().map(|s| s.arrival_time.max(0)).max().unwrap_or(0);
    specs
        .iter()
        .map(|s| s.burst_time.max(0))
        .try_fold(latest, i64::checked_add)
}

/// Validates a Round-Robin quantum and narrows it to a positive value.
pub fn validate_quantum(quantum: Option<i64>) -> Result<i64, ValidationError> {
    match quantum {
        None => Err(ValidationError::new(
            ValidationErrorKind::MissingQuantum,
            "Round-Robin requires a time quantum",
        )),
        Some(q) if q <= 0 => Err(ValidationError::new(
            ValidationErrorKind::InvalidQuantum,
            format!("Time quantum must be a positive integer, got {q}"),
        )),
        Some(q) => Ok(q),
    }
}

/// Resolves the pid of every spec.
///
/// Explicit pids are kept. Missing ones are numbered in arrival order
/// (input position breaks ties), each taking the smallest positive
/// integer not already used. Assumes the specs passed
/// [`validate_processes`].
pub fn assign_pids(specs: &[ProcessSpec]) -> Vec<Pid> {
    let explicit = |spec: &ProcessSpec| spec.pid.and_then(|p| Pid::try_from(p).ok());
    let taken: HashSet<Pid> = specs.iter().filter_map(explicit).collect();

    let mut pids: Vec<Pid> = specs.iter().map(|s| explicit(s).unwrap_or(0)).collect();
    let mut implicit: Vec<usize> = (0..specs.len()).filter(|&i| pids[i] == 0).collect();
    implicit.sort_by_key(|&i| specs[i].arrival_time);

    let mut next: Pid = 1;
    for index in implicit {
        while taken.contains(&next) {
            next += 1;
        }
        pids[index] = next;
        next += 1;
    }
    pids
}

fn describe(index: usize, spec: &ProcessSpec) -> String {
    match spec.pid {
        Some(pid) => format!("Process {pid}"),
        None => format!("Process #{}", index + 1),
    }
}

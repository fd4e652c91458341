//! Simulation errors.
//!
//! Two families are kept apart so a caller can never confuse them:
//! [`SimulationError::InvalidInput`] means the request was rejected before
//! anything ran; [`SimulationError::InvariantViolation`] means a policy
//! produced an impossible schedule, which is a fault in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{ValidationError, ValidationErrorKind};

/// Internal fault detected while running or verifying a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    /// Fault category.
    pub kind: InvariantViolationKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of internal faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvariantViolationKind {
    /// A process finished with `waiting_time < 0`.
    NegativeWaitingTime,
    /// The step budget was exhausted before all processes finished.
    NonTermination,
    /// A policy returned with unfinished processes.
    IncompleteProcess,
    /// Stored timing fields disagree with the timing identities.
    InconsistentTiming,
}

impl InvariantViolation {
    pub(crate) fn new(kind: InvariantViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal scheduling fault ({:?}): {}", self.kind, self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Error returned by a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The input was rejected; no simulation was started.
    InvalidInput(Vec<ValidationError>),
    /// The engine broke one of its own invariants.
    InvariantViolation(InvariantViolation),
}

impl SimulationError {
    /// Whether this is a user-facing input error.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SimulationError::InvalidInput(_))
    }

    /// Validation errors, empty for internal faults.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            SimulationError::InvalidInput(errors) => errors,
            SimulationError::InvariantViolation(_) => &[],
        }
    }

    /// Whether any validation error has the given kind.
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.validation_errors().iter().any(|e| e.kind == kind)
    }

    /// The internal fault kind, if this is one.
    pub fn violation_kind(&self) -> Option<InvariantViolationKind> {
        match self {
            SimulationError::InvariantViolation(v) => Some(v.kind),
            SimulationError::InvalidInput(_) => None,
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidInput(errors) => {
                write!(f, "invalid input")?;
                for (i, e) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{sep}{e}")?;
                }
                Ok(())
            }
            SimulationError::InvariantViolation(v) => v.fmt(f),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<Vec<ValidationError>> for SimulationError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SimulationError::InvalidInput(errors)
    }
}

impl From<InvariantViolation> for SimulationError {
    fn from(violation: InvariantViolation) -> Self {
        SimulationError::InvariantViolation(violation)
    }
}

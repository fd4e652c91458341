//! Uniprocessor CPU scheduling simulator.
//!
//! Replays a set of processes (arrival time, burst time, optional
//! priority) under a classical scheduling policy and reports the
//! execution timeline, per-process timing and aggregate metrics.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProcessSpec`, `Process`, `Timeline`
//! - **`validation`**: Input integrity checks (burst, arrival, pids, priority, quantum)
//! - **`policies`**: FCFS, SJF, SRTF, Round-Robin, Non-preemptive and Preemptive Priority
//! - **`simulator`**: Run driver, invariant verification and metrics
//! - **`loader`**: Line-oriented and inline process input formats
//! - **`workload`**: Seeded random process sets
//! - **`error`**: Input errors vs. internal scheduling faults
//!
//! # Example
//!
//! ```
//! use cpu_schedule::models::ProcessSpec;
//! use cpu_schedule::simulator;
//!
//! let specs = vec![ProcessSpec::new(0, 5), ProcessSpec::new(2, 3)];
//! let outcome = simulator::fcfs(&specs).unwrap();
//!
//! assert!((outcome.average_waiting_time() - 1.5).abs() < 1e-10);
//! assert_eq!(outcome.process(2).unwrap().waiting_time, Some(3));
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

pub mod error;
pub mod loader;
pub mod models;
pub mod policies;
pub mod simulator;
pub mod validation;
pub mod workload;

pub use error::SimulationError;
pub use models::{Process, ProcessSpec, Timeline};
pub use policies::{PolicyKind, SchedulingPolicy, Variant};
pub use simulator::{SimulationOutcome, Simulator};

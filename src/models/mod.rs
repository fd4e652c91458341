//! CPU scheduling domain models.
//!
//! Provides the input description of a job, the working record each
//! policy mutates, and the timeline a run produces.
//!
//! # Domain Mappings
//!
//! | cpu-schedule | Textbook | Batch system |
//! |--------------|----------|--------------|
//! | ProcessSpec | Process control block (static part) | Job card |
//! | Process | PCB with accounting fields | Job record |
//! | Timeline | Gantt chart | Machine log |

mod process;
mod timeline;

pub use process::{Pid, Process, ProcessSpec};
pub use timeline::{Occupant, Slice, Timeline};

//! Task dependency scheduling core.
//!
//! Given task records with optional dependency lists and durations, this
//! crate detects circular dependencies, produces a dependency-respecting
//! order, computes each task's earliest start and marks the critical path.
//!
//! Every call works on its own snapshot of tasks and builds its working
//! structures from scratch; nothing is shared between calls.

pub mod config;
pub mod cycle;
pub mod dependencies;
mod graph;
mod interner;
pub mod logging;
mod models;
pub mod schedule;
pub mod topo;

#[cfg(feature = "python")]
mod python;

pub use config::ScheduleConfig;
pub use cycle::{check_candidate, find_cycle, would_create_cycle, DependencyError};
pub use dependencies::{
    encode_dependencies, parse_dependencies, try_parse_dependencies, DependencyParseError,
};
pub use models::{CycleCandidate, Schedule, ScheduledTask, Task, TaskId};
pub use schedule::{schedule_tasks, schedule_tasks_now};
pub use topo::topological_order;

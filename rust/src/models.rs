//! Core data types for the scheduling system.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Stable integer identifier of a task.
pub type TaskId = i64;

/// A task record as supplied by the persistence layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Serialized dependency list (JSON array of task ids). May be absent or malformed.
    #[serde(default)]
    pub dependencies: Option<String>,
    /// Duration in hours.
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with no dependencies, default duration and no due date.
    pub fn new(id: TaskId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            dependencies: None,
            duration_hours: None,
            due_date: None,
            created_at,
        }
    }

    /// Set the serialized dependency field.
    pub fn with_dependencies(mut self, raw: impl Into<String>) -> Self {
        self.dependencies = Some(raw.into());
        self
    }

    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = Some(hours);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Duration in hours, falling back to `default_hours` when absent,
    /// non-finite or not strictly positive.
    pub fn effective_duration(&self, default_hours: f64) -> f64 {
        match self.duration_hours {
            Some(h) if h.is_finite() && h > 0.0 => h,
            _ => default_hours,
        }
    }
}

/// A task that is about to be created or updated, checked for cycles
/// before it is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCandidate {
    /// `None` for a brand-new task that has no identifier yet.
    pub id: Option<TaskId>,
    pub dependencies: Vec<TaskId>,
}

impl CycleCandidate {
    pub fn new(id: Option<TaskId>, dependencies: Vec<TaskId>) -> Self {
        Self { id, dependencies }
    }
}

/// A task augmented with its computed schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub task: Task,
    /// Parsed dependency ids, in encoded order.
    pub dependency_ids: Vec<TaskId>,
    pub earliest_start: DateTime<Utc>,
    pub completion: DateTime<Utc>,
    pub is_critical: bool,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// Result of one scheduling call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schedule {
    /// The single "now" captured for this computation.
    pub reference_time: DateTime<Utc>,
    /// Topological processing order.
    pub order: Vec<TaskId>,
    /// One entry per input record, in input order.
    pub tasks: Vec<ScheduledTask>,
    /// Critical path from its first task to the end task.
    pub critical_path: Vec<TaskId>,
    /// Task id -> position of its first record in `tasks`.
    #[serde(skip)]
    positions: FxHashMap<TaskId, usize>,
}

impl Schedule {
    pub fn new(
        reference_time: DateTime<Utc>,
        order: Vec<TaskId>,
        tasks: Vec<ScheduledTask>,
        critical_path: Vec<TaskId>,
    ) -> Self {
        let mut positions =
            FxHashMap::with_capacity_and_hasher(tasks.len(), Default::default());
        for (pos, task) in tasks.iter().enumerate() {
            positions.entry(task.task.id).or_insert(pos);
        }
        Self {
            reference_time,
            order,
            tasks,
            critical_path,
            positions,
        }
    }

    pub fn empty(reference_time: DateTime<Utc>) -> Self {
        Self::new(reference_time, Vec::new(), Vec::new(), Vec::new())
    }

    /// Look up the scheduled entry for a task id (first record if duplicated).
    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask> {
        match self.positions.get(&id) {
            Some(&pos) => self.tasks.get(pos),
            // Deserialized schedules carry no index
            None if self.positions.is_empty() => self.tasks.iter().find(|t| t.task.id == id),
            None => None,
        }
    }

    pub fn is_critical(&self, id: TaskId) -> bool {
        self.get(id).is_some_and(|t| t.is_critical)
    }

    /// Time from the reference "now" to the completion of the end task.
    pub fn makespan(&self) -> Option<chrono::Duration> {
        let end = *self.critical_path.last()?;
        self.get(end)
            .map(|t| t.completion - self.reference_time)
    }
}

// The lookup index is derived from `tasks`
impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.reference_time == other.reference_time
            && self.order == other.order
            && self.tasks == other.tasks
            && self.critical_path == other.critical_path
    }
}

//! Python bindings for the host application.
//!
//! Exposes the two call shapes the application needs: computing a schedule
//! and checking a candidate dependency set for cycles.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::{DateTime, Utc};
use pyo3::prelude::*;

use crate::config::ScheduleConfig;
use crate::models::{CycleCandidate, ScheduledTask, Task};

/// A task record (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: i64,
    #[pyo3(get, set)]
    pub title: String,
    #[pyo3(get, set)]
    pub dependencies: Option<String>,
    #[pyo3(get, set)]
    pub duration_hours: Option<f64>,
    #[pyo3(get, set)]
    pub due_date: Option<DateTime<Utc>>,
    #[pyo3(get, set)]
    pub created_at: DateTime<Utc>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (id, title, created_at, dependencies=None, duration_hours=None, due_date=None))]
    fn new(
        id: i64,
        title: String,
        created_at: DateTime<Utc>,
        dependencies: Option<String>,
        duration_hours: Option<f64>,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            title,
            dependencies,
            duration_hours,
            due_date,
            created_at,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, title={:?}, deps={:?})",
            self.id, self.title, self.dependencies
        )
    }
}

impl From<PyTask> for Task {
    fn from(t: PyTask) -> Self {
        Task {
            id: t.id,
            title: t.title,
            dependencies: t.dependencies,
            duration_hours: t.duration_hours,
            due_date: t.due_date,
            created_at: t.created_at,
        }
    }
}

/// A task with its computed schedule (PyO3 wrapper).
#[pyclass(name = "ScheduledTask")]
#[derive(Clone, Debug)]
pub struct PyScheduledTask {
    #[pyo3(get)]
    pub id: i64,
    #[pyo3(get)]
    pub title: String,
    #[pyo3(get)]
    pub dependency_ids: Vec<i64>,
    #[pyo3(get)]
    pub duration_hours: Option<f64>,
    #[pyo3(get)]
    pub due_date: Option<DateTime<Utc>>,
    #[pyo3(get)]
    pub earliest_start: DateTime<Utc>,
    #[pyo3(get)]
    pub completion: DateTime<Utc>,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl PyScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(id={}, start={}, critical={})",
            self.id, self.earliest_start, self.is_critical
        )
    }
}

impl From<ScheduledTask> for PyScheduledTask {
    fn from(s: ScheduledTask) -> Self {
        Self {
            id: s.task.id,
            title: s.task.title,
            dependency_ids: s.dependency_ids,
            duration_hours: s.task.duration_hours,
            due_date: s.task.due_date,
            earliest_start: s.earliest_start,
            completion: s.completion,
            is_critical: s.is_critical,
        }
    }
}

/// Schedule configuration (PyO3 wrapper).
#[pyclass(name = "ScheduleConfig")]
#[derive(Clone, Debug)]
pub struct PyScheduleConfig {
    inner: ScheduleConfig,
}

#[pymethods]
impl PyScheduleConfig {
    #[new]
    #[pyo3(signature = (default_duration_hours=None, critical_tolerance_ms=None, verbosity=None))]
    fn new(
        default_duration_hours: Option<f64>,
        critical_tolerance_ms: Option<i64>,
        verbosity: Option<u8>,
    ) -> Self {
        Self {
            inner: ScheduleConfig::new(default_duration_hours, critical_tolerance_ms, verbosity),
        }
    }

    #[getter]
    fn default_duration_hours(&self) -> f64 {
        self.inner.default_duration_hours
    }

    #[getter]
    fn critical_tolerance_ms(&self) -> i64 {
        self.inner.critical_tolerance_ms
    }

    #[getter]
    fn verbosity(&self) -> u8 {
        self.inner.verbosity
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleConfig(default_duration_hours={}, critical_tolerance_ms={}, verbosity={})",
            self.inner.default_duration_hours, self.inner.critical_tolerance_ms, self.inner.verbosity
        )
    }
}

/// Compute earliest starts and the critical path for a task snapshot.
///
/// # Arguments
/// * `tasks` - Current task records
/// * `now` - Reference time; sampled once from the clock when omitted
/// * `config` - Schedule configuration (defaults when omitted)
///
/// # Returns
/// * One ScheduledTask per input task, in input order
#[pyfunction]
#[pyo3(name = "schedule_tasks", signature = (tasks, now=None, config=None))]
fn py_schedule_tasks(
    tasks: Vec<PyTask>,
    now: Option<DateTime<Utc>>,
    config: Option<PyScheduleConfig>,
) -> Vec<PyScheduledTask> {
    let tasks: Vec<Task> = tasks.into_iter().map(Task::from).collect();
    let config = config.map(|c| c.inner).unwrap_or_default();
    let schedule = crate::schedule::schedule_tasks(&tasks, now.unwrap_or_else(Utc::now), &config);
    schedule.tasks.into_iter().map(PyScheduledTask::from).collect()
}

/// Check whether a candidate dependency set would introduce a cycle.
///
/// # Arguments
/// * `tasks` - Current task records
/// * `candidate_id` - Id of the task being edited, or None for a new task
/// * `dependencies` - Proposed dependency ids for the candidate
#[pyfunction]
#[pyo3(name = "would_create_cycle", signature = (tasks, candidate_id, dependencies))]
fn py_would_create_cycle(tasks: Vec<PyTask>, candidate_id: Option<i64>, dependencies: Vec<i64>) -> bool {
    let tasks: Vec<Task> = tasks.into_iter().map(Task::from).collect();
    crate::cycle::would_create_cycle(&tasks, &CycleCandidate::new(candidate_id, dependencies))
}

/// Decode a stored dependency list; malformed input yields an empty list.
#[pyfunction]
#[pyo3(name = "parse_dependencies", signature = (raw=None))]
fn py_parse_dependencies(raw: Option<&str>) -> Vec<i64> {
    crate::dependencies::parse_dependencies(raw)
}

/// The taskplan_rust Python module.
#[pymodule]
fn taskplan_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_class::<PyScheduledTask>()?;
    m.add_class::<PyScheduleConfig>()?;

    m.add_function(wrap_pyfunction!(py_schedule_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(py_would_create_cycle, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_dependencies, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wrappers_round_through_core_types() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let py_task = PyTask {
            id: 3,
            title: "ship".to_string(),
            dependencies: Some("[1]".to_string()),
            duration_hours: Some(2.0),
            due_date: None,
            created_at: created,
        };
        let task = Task::from(py_task);
        let schedule = crate::schedule::schedule_tasks(&[task], created, &ScheduleConfig::default());
        let scheduled = PyScheduledTask::from(schedule.tasks[0].clone());

        assert_eq!(scheduled.id, 3);
        assert_eq!(scheduled.dependency_ids, vec![1]);
        assert_eq!(scheduled.earliest_start, created);
        assert!(scheduled.is_critical);
    }
}

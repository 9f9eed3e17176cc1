//! Earliest-start scheduling and critical path tracing.
//!
//! Tasks are walked in topological order; each starts when its latest
//! dependency completes (or at the reference time when it has none). The
//! critical path is then traced backward from the task that completes last.

use chrono::{DateTime, Duration, Utc};

use crate::config::ScheduleConfig;
use crate::dependencies::try_parse_dependencies;
use crate::graph::DependencyGraph;
use crate::interner::NodeId;
use crate::models::{Schedule, ScheduledTask, Task};
use crate::topo::order_nodes;
use crate::{log_changes, log_checks, log_debug};

/// Start and completion of one scheduled node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeTiming {
    start: DateTime<Utc>,
    completion: DateTime<Utc>,
}

/// Convert fractional hours to a duration with millisecond precision.
fn hours_to_duration(hours: f64) -> Duration {
    // `as` saturates, and i64::MAX milliseconds is within Duration's range
    let millis = (hours * 3_600_000.0).round() as i64;
    Duration::milliseconds(millis.max(0))
}

fn add_saturating(at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    at.checked_add_signed(duration)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Compute the schedule for a task snapshot against a fixed reference time.
///
/// `now` is used for every task without dependencies, so all such tasks
/// share the same start within one computation. Cyclic collections are not
/// rejected here: tasks the orderer cannot place start at `now` and are
/// never on the critical path.
pub fn schedule_tasks(tasks: &[Task], now: DateTime<Utc>, config: &ScheduleConfig) -> Schedule {
    let verbosity = config.verbosity;

    if tasks.is_empty() {
        log_checks!(verbosity, "no tasks to schedule");
        return Schedule::empty(now);
    }

    let graph = DependencyGraph::from_tasks(tasks);
    let order = order_nodes(&graph);
    if order.len() < graph.task_nodes().len() {
        log_changes!(
            verbosity,
            ordered = order.len(),
            total = graph.task_nodes().len(),
            "dependency graph has a cycle; order is truncated"
        );
    }

    // First record per node supplies the duration
    let mut records: Vec<Option<&Task>> = vec![None; graph.node_count()];
    for task in tasks {
        if let Some(node) = graph.node(task.id) {
            if records[node as usize].is_none() {
                records[node as usize] = Some(task);
            }
        }
    }
    let duration_of = |task: &Task| {
        hours_to_duration(task.effective_duration(config.default_duration_hours))
    };

    // Forward pass
    let mut timings: Vec<Option<NodeTiming>> = vec![None; graph.node_count()];
    for &node in &order {
        let start = graph
            .dependencies(node)
            .iter()
            .filter_map(|&dep| timings[dep as usize].map(|t| t.completion))
            .fold(now, |latest, completion| latest.max(completion));

        let duration = records[node as usize]
            .map(duration_of)
            .unwrap_or_else(|| hours_to_duration(config.default_duration_hours));
        let completion = add_saturating(start, duration);

        log_checks!(
            verbosity,
            task_id = graph.task_id(node),
            %start,
            %completion,
            "scheduled task"
        );
        timings[node as usize] = Some(NodeTiming { start, completion });
    }

    let critical_nodes = trace_critical_path(&graph, &order, &timings, config);
    let mut on_path = vec![false; graph.node_count()];
    for &node in &critical_nodes {
        on_path[node as usize] = true;
    }

    let scheduled: Vec<ScheduledTask> = tasks
        .iter()
        .map(|task| {
            let placed = graph
                .node(task.id)
                .and_then(|node| timings[node as usize].map(|t| (t, on_path[node as usize])));
            let (timing, is_critical) = placed.unwrap_or_else(|| {
                let timing = NodeTiming {
                    start: now,
                    completion: add_saturating(now, duration_of(task)),
                };
                (timing, false)
            });
            let dependency_ids = try_parse_dependencies(task.dependencies.as_deref())
                .unwrap_or_else(|err| {
                    log_checks!(
                        verbosity,
                        task_id = task.id,
                        error = %err,
                        "dependency list unreadable; scheduled without dependencies"
                    );
                    Vec::new()
                });
            ScheduledTask {
                task: task.clone(),
                dependency_ids,
                earliest_start: timing.start,
                completion: timing.completion,
                is_critical,
            }
        })
        .collect();

    let critical_path: Vec<_> = critical_nodes.iter().map(|&n| graph.task_id(n)).collect();
    log_changes!(
        verbosity,
        tasks = scheduled.len(),
        critical_path = ?critical_path,
        "schedule computed"
    );

    Schedule::new(
        now,
        order.iter().map(|&n| graph.task_id(n)).collect(),
        scheduled,
        critical_path,
    )
}

/// Compute the schedule, sampling the clock once for the whole call.
pub fn schedule_tasks_now(tasks: &[Task], config: &ScheduleConfig) -> Schedule {
    schedule_tasks(tasks, Utc::now(), config)
}

/// Trace the critical path backward from the latest-completing task.
///
/// Returns nodes from the first task of the path to the end task.
fn trace_critical_path(
    graph: &DependencyGraph,
    order: &[NodeId],
    timings: &[Option<NodeTiming>],
    config: &ScheduleConfig,
) -> Vec<NodeId> {
    let completion = |node: NodeId| timings[node as usize].map(|t| t.completion);

    // Latest completion wins; lowest task id on ties
    let Some(end) = order.iter().copied().max_by(|&a, &b| {
        completion(a)
            .cmp(&completion(b))
            .then_with(|| graph.task_id(b).cmp(&graph.task_id(a)))
    }) else {
        return Vec::new();
    };

    let tolerance = config.tolerance();
    let mut visited = vec![false; graph.node_count()];
    let mut path = Vec::new();
    let mut current = end;

    loop {
        visited[current as usize] = true;
        path.push(current);

        let Some(current_timing) = timings[current as usize] else {
            break;
        };

        // Dependency that drove this start: completion within tolerance of
        // it, latest completion first, first listed on exact ties
        let mut driver: Option<(NodeId, DateTime<Utc>)> = None;
        for &dep in graph.dependencies(current) {
            if visited[dep as usize] {
                continue;
            }
            let Some(dep_completion) = completion(dep) else {
                continue;
            };
            if (dep_completion - current_timing.start).abs() > tolerance {
                continue;
            }
            if driver.map_or(true, |(_, best)| dep_completion > best) {
                driver = Some((dep, dep_completion));
            }
        }

        match driver {
            Some((dep, _)) => {
                log_debug!(
                    config.verbosity,
                    from = graph.task_id(current),
                    to = graph.task_id(dep),
                    "critical path step"
                );
                current = dep;
            }
            None => break,
        }
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::encode_dependencies;
    use crate::models::TaskId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn task(id: TaskId, deps: &[TaskId], hours: Option<f64>) -> Task {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut t = Task::new(id, format!("task {id}"), created);
        if !deps.is_empty() {
            t = t.with_dependencies(encode_dependencies(deps));
        }
        t.duration_hours = hours;
        t
    }

    fn run(tasks: &[Task]) -> Schedule {
        schedule_tasks(tasks, now(), &ScheduleConfig::default())
    }

    #[test]
    fn test_empty_collection() {
        let schedule = run(&[]);
        assert!(schedule.order.is_empty());
        assert!(schedule.tasks.is_empty());
        assert!(schedule.critical_path.is_empty());
        assert_eq!(schedule.reference_time, now());
    }

    #[test]
    fn test_single_task() {
        let schedule = run(&[task(1, &[], None)]);
        let t = schedule.get(1).unwrap();
        assert_eq!(t.earliest_start, now());
        assert_eq!(t.completion, now() + Duration::hours(1));
        assert!(t.is_critical);
        assert_eq!(schedule.critical_path, vec![1]);
        assert_eq!(schedule.makespan(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_scenario_a_chain() {
        let tasks = vec![task(1, &[], Some(2.0)), task(2, &[1], Some(3.0))];
        let schedule = run(&tasks);

        assert_eq!(schedule.order, vec![1, 2]);
        assert_eq!(schedule.get(1).unwrap().earliest_start, now());
        assert_eq!(
            schedule.get(2).unwrap().earliest_start,
            now() + Duration::hours(2)
        );
        assert_eq!(schedule.get(2).unwrap().completion, now() + Duration::hours(5));
        assert_eq!(schedule.critical_path, vec![1, 2]);
        assert!(schedule.is_critical(1));
        assert!(schedule.is_critical(2));
    }

    #[test]
    fn test_scenario_b_cycle_degrades() {
        let tasks = vec![task(1, &[2], None), task(2, &[1], None)];
        let schedule = run(&tasks);

        assert!(schedule.order.is_empty());
        assert!(schedule.critical_path.is_empty());
        assert_eq!(schedule.tasks.len(), 2);
        for t in &schedule.tasks {
            assert_eq!(t.earliest_start, now());
            assert_eq!(t.completion, now() + Duration::hours(1));
            assert!(!t.is_critical);
        }
    }

    #[test]
    fn test_scenario_c_tie_picks_first_listed() {
        let tasks = vec![
            task(1, &[], Some(1.0)),
            task(2, &[], Some(1.0)),
            task(3, &[1, 2], Some(1.0)),
        ];
        let schedule = run(&tasks);

        let t3 = schedule.get(3).unwrap();
        assert_eq!(t3.earliest_start, now() + Duration::hours(1));
        assert_eq!(t3.completion, now() + Duration::hours(2));
        assert_eq!(schedule.critical_path, vec![1, 3]);
        assert!(!schedule.is_critical(2));
    }

    #[test]
    fn test_tie_follows_dependency_list_order() {
        let tasks = vec![
            task(1, &[], Some(1.0)),
            task(2, &[], Some(1.0)),
            task(3, &[2, 1], Some(1.0)),
        ];
        assert_eq!(run(&tasks).critical_path, vec![2, 3]);
    }

    #[test]
    fn test_longest_branch_is_critical() {
        // 1 (2h) -> 3, 2 (5h) -> 3
        let tasks = vec![
            task(1, &[], Some(2.0)),
            task(2, &[], Some(5.0)),
            task(3, &[1, 2], Some(1.0)),
        ];
        let schedule = run(&tasks);
        assert_eq!(
            schedule.get(3).unwrap().earliest_start,
            now() + Duration::hours(5)
        );
        assert_eq!(schedule.critical_path, vec![2, 3]);
        assert!(!schedule.is_critical(1));
    }

    #[test]
    fn test_near_tie_within_tolerance_prefers_latest() {
        // 2 completes 500ms before 1; both drive 3, latest wins
        let tasks = vec![
            task(1, &[], Some(1.0)),
            task(2, &[], Some(1.0 - 0.5 / 3600.0)),
            task(3, &[2, 1], Some(1.0)),
        ];
        assert_eq!(run(&tasks).critical_path, vec![1, 3]);
    }

    #[test]
    fn test_end_task_tie_prefers_lowest_id() {
        let tasks = vec![task(5, &[], Some(2.0)), task(3, &[], Some(2.0))];
        let schedule = run(&tasks);
        assert_eq!(schedule.critical_path, vec![3]);
        assert!(!schedule.is_critical(5));
    }

    #[test]
    fn test_malformed_dependencies_scheduled_as_none() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let tasks = vec![
            task(1, &[], Some(4.0)),
            Task::new(2, "broken", created).with_dependencies("not-json"),
        ];
        let schedule = run(&tasks);
        let t2 = schedule.get(2).unwrap();
        assert!(t2.dependency_ids.is_empty());
        assert_eq!(t2.earliest_start, now());

        // The fallback event is gated, the result is the same at any level
        let loud = ScheduleConfig {
            verbosity: crate::logging::VERBOSITY_DEBUG,
            ..ScheduleConfig::default()
        };
        assert_eq!(schedule_tasks(&tasks, now(), &loud), schedule);
    }

    #[test]
    fn test_dangling_dependency_ignored() {
        let tasks = vec![task(1, &[404], Some(2.0))];
        let schedule = run(&tasks);
        let t1 = schedule.get(1).unwrap();
        assert_eq!(t1.dependency_ids, vec![404]);
        assert_eq!(t1.earliest_start, now());
        assert_eq!(schedule.critical_path, vec![1]);
    }

    #[test]
    fn test_default_and_invalid_durations() {
        let tasks = vec![
            task(1, &[], None),
            task(2, &[1], Some(0.0)),
            task(3, &[2], Some(-1.0)),
        ];
        let schedule = run(&tasks);
        assert_eq!(schedule.get(3).unwrap().completion, now() + Duration::hours(3));
    }

    #[test]
    fn test_fractional_hours() {
        let tasks = vec![task(1, &[], Some(0.25))];
        let schedule = run(&tasks);
        assert_eq!(
            schedule.get(1).unwrap().completion,
            now() + Duration::minutes(15)
        );
    }

    #[test]
    fn test_configured_default_duration() {
        let config = ScheduleConfig {
            default_duration_hours: 8.0,
            ..ScheduleConfig::default()
        };
        let schedule = schedule_tasks(&[task(1, &[], None)], now(), &config);
        assert_eq!(schedule.get(1).unwrap().completion, now() + Duration::hours(8));
    }

    #[test]
    fn test_output_preserves_input_order_and_fields() {
        let due = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let tasks = vec![
            task(2, &[1], Some(1.0)).with_due_date(due),
            task(1, &[], Some(1.0)),
        ];
        let schedule = run(&tasks);
        let ids: Vec<TaskId> = schedule.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(schedule.tasks[0].task, tasks[0]);
        assert_eq!(schedule.tasks[0].task.due_date, Some(due));
        assert_eq!(schedule.order, vec![1, 2]);
    }

    #[test]
    fn test_idempotent_for_same_snapshot() {
        let tasks = vec![
            task(1, &[], Some(1.5)),
            task(2, &[1], Some(2.0)),
            task(3, &[1], Some(0.5)),
            task(4, &[2, 3], None),
        ];
        assert_eq!(run(&tasks), run(&tasks));
    }

    #[test]
    fn test_partial_cycle_keeps_rest_scheduled() {
        let tasks = vec![
            task(1, &[], Some(3.0)),
            task(2, &[3], None),
            task(3, &[2], None),
            task(4, &[1], Some(1.0)),
        ];
        let schedule = run(&tasks);
        assert_eq!(schedule.order, vec![1, 4]);
        assert_eq!(schedule.critical_path, vec![1, 4]);
        assert!(!schedule.is_critical(2));
        assert_eq!(schedule.get(3).unwrap().earliest_start, now());
    }

    #[test]
    fn test_huge_duration_saturates() {
        let tasks = vec![task(1, &[], Some(f64::MAX)), task(2, &[1], Some(1.0))];
        let schedule = run(&tasks);
        assert_eq!(schedule.get(1).unwrap().completion, DateTime::<Utc>::MAX_UTC);
        assert_eq!(schedule.get(2).unwrap().completion, DateTime::<Utc>::MAX_UTC);
    }
}

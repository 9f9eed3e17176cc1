//! Circular dependency detection.

use thiserror::Error;

use crate::graph::DependencyGraph;
use crate::interner::NodeId;
use crate::models::{CycleCandidate, Task, TaskId};

/// Reasons a candidate dependency set is rejected by [`check_candidate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Task {0} depends on itself")]
    SelfDependency(TaskId),
    #[error("Circular dependency detected: {}", format_cycle(.0))]
    CircularDependency(Vec<TaskId>),
}

fn format_cycle(cycle: &[TaskId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Explored,
}

/// Depth-first search from every node; returns the first cycle found as a
/// closed node path (`[a, b, a]`).
fn find_cycle_nodes(graph: &DependencyGraph) -> Option<Vec<NodeId>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    // (node, position of the next dependency to visit)
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for root in 0..graph.node_count() as NodeId {
        if marks[root as usize] != Mark::Unvisited {
            continue;
        }
        marks[root as usize] = Mark::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            let deps = graph.dependencies(node);
            if pos == deps.len() {
                marks[node as usize] = Mark::Explored;
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let dep = deps[pos];
            match marks[dep as usize] {
                Mark::Unvisited => {
                    marks[dep as usize] = Mark::OnStack;
                    stack.push((dep, 0));
                }
                Mark::OnStack => {
                    let start = stack.iter().position(|&(n, _)| n == dep).unwrap_or(0);
                    let mut cycle: Vec<NodeId> = stack[start..].iter().map(|&(n, _)| n).collect();
                    cycle.push(dep);
                    return Some(cycle);
                }
                Mark::Explored => {}
            }
        }
    }

    None
}

fn graph_with_candidate(tasks: &[Task], candidate: &CycleCandidate) -> DependencyGraph {
    let mut graph = DependencyGraph::from_tasks(tasks);
    // A candidate without an id has no incoming edges, so it cannot close a
    // cycle; the verdict is that of the existing graph.
    if let Some(id) = candidate.id {
        graph.set_dependencies(id, &candidate.dependencies);
    }
    graph
}

/// Whether adding `candidate` to `tasks` leaves a cycle anywhere in the graph.
///
/// A candidate with an id replaces that task's dependency list (or adds the
/// task when the id is new). Dangling dependency ids are leaf nodes.
pub fn would_create_cycle(tasks: &[Task], candidate: &CycleCandidate) -> bool {
    let graph = graph_with_candidate(tasks, candidate);
    find_cycle_nodes(&graph).is_some()
}

/// Find one cycle in the current task graph, as a closed path of task ids
/// where each task depends on the next (`[1, 2, 1]`).
pub fn find_cycle(tasks: &[Task]) -> Option<Vec<TaskId>> {
    let graph = DependencyGraph::from_tasks(tasks);
    find_cycle_nodes(&graph).map(|nodes| nodes.into_iter().map(|n| graph.task_id(n)).collect())
}

/// Reject a candidate whose dependencies would create a cycle.
///
/// Convenience for callers whose policy is to refuse the change outright.
pub fn check_candidate(tasks: &[Task], candidate: &CycleCandidate) -> Result<(), DependencyError> {
    if let Some(id) = candidate.id {
        if candidate.dependencies.contains(&id) {
            return Err(DependencyError::SelfDependency(id));
        }
    }

    let graph = graph_with_candidate(tasks, candidate);
    match find_cycle_nodes(&graph) {
        Some(nodes) => Err(DependencyError::CircularDependency(
            nodes.into_iter().map(|n| graph.task_id(n)).collect(),
        )),
        None => Ok(()),
    }
}

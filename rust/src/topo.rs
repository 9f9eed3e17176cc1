//! Dependency-respecting task order (Kahn's algorithm).

use std::collections::VecDeque;

use crate::graph::DependencyGraph;
use crate::interner::NodeId;
use crate::models::{Task, TaskId};

/// Order the collection's task nodes so each comes after its dependencies.
///
/// Only edges to dependencies inside the collection count. Ties are broken
/// by input order. On a cyclic graph the tasks on or behind a cycle never
/// reach in-degree zero and are left out.
pub(crate) fn order_nodes(graph: &DependencyGraph) -> Vec<NodeId> {
    let forward = graph.dependents();

    // In-degree = number of in-collection dependency edges
    let mut in_degree = vec![0usize; graph.node_count()];
    for dependents in &forward {
        for &node in dependents {
            in_degree[node as usize] += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = graph
        .task_nodes()
        .iter()
        .copied()
        .filter(|&node| in_degree[node as usize] == 0)
        .collect();

    let mut result: Vec<NodeId> = Vec::with_capacity(graph.task_nodes().len());

    while let Some(node) = queue.pop_front() {
        result.push(node);

        for &dependent in &forward[node as usize] {
            let degree = &mut in_degree[dependent as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    result
}

/// Compute one valid processing order for `tasks`.
///
/// Does not detect cycles: a cyclic collection yields a truncated order.
/// Callers are expected to have rejected cycles with
/// [`crate::cycle::would_create_cycle`] first.
pub fn topological_order(tasks: &[Task]) -> Vec<TaskId> {
    let graph = DependencyGraph::from_tasks(tasks);
    order_nodes(&graph)
        .into_iter()
        .map(|node| graph.task_id(node))
        .collect()
}

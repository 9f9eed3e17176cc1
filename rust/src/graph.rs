//! Dependency graph built fresh from a task snapshot.
//!
//! One representation serves both cycle detection and ordering. Nodes are
//! dense indices: every task in the collection first (input order, first
//! occurrence wins for duplicated ids), then any dangling dependency ids,
//! which have no dependencies of their own.

use crate::dependencies::parse_dependencies;
use crate::interner::{NodeId, TaskIndex};
use crate::models::{Task, TaskId};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    index: TaskIndex,
    /// "Depends-on" adjacency per node, in encoded order.
    deps: Vec<Vec<NodeId>>,
    /// Whether the node is a task of the collection (false for dangling ids).
    in_collection: Vec<bool>,
    /// Collection task nodes in input order.
    task_nodes: Vec<NodeId>,
}

impl DependencyGraph {
    /// Build the graph for a task snapshot.
    ///
    /// A missing or malformed dependency field contributes no edges.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph = Self {
            index: TaskIndex::with_capacity(tasks.len()),
            deps: Vec::with_capacity(tasks.len()),
            in_collection: Vec::with_capacity(tasks.len()),
            task_nodes: Vec::with_capacity(tasks.len()),
        };

        // Intern every task before any dependency so collection nodes are contiguous
        for task in tasks {
            if graph.index.get(task.id).is_none() {
                let node = graph.intern_node(task.id);
                graph.in_collection[node as usize] = true;
                graph.task_nodes.push(node);
            }
        }

        let mut filled = vec![false; graph.task_nodes.len()];
        for task in tasks {
            let Some(node) = graph.index.get(task.id) else {
                continue;
            };
            if std::mem::replace(&mut filled[node as usize], true) {
                continue;
            }
            let dep_nodes: Vec<NodeId> = parse_dependencies(task.dependencies.as_deref())
                .into_iter()
                .map(|d| graph.intern_node(d))
                .collect();
            graph.deps[node as usize] = dep_nodes;
        }

        graph
    }

    /// Replace (or add) one task's dependency list.
    ///
    /// An id not yet in the graph becomes a collection task appended after
    /// the existing ones.
    pub fn set_dependencies(&mut self, id: TaskId, deps: &[TaskId]) {
        let node = self.intern_node(id);
        if !self.in_collection[node as usize] {
            self.in_collection[node as usize] = true;
            self.task_nodes.push(node);
        }
        let dep_nodes: Vec<NodeId> = deps.iter().map(|&d| self.intern_node(d)).collect();
        self.deps[node as usize] = dep_nodes;
    }

    fn intern_node(&mut self, id: TaskId) -> NodeId {
        let node = self.index.intern(id);
        if node as usize >= self.deps.len() {
            self.deps.push(Vec::new());
            self.in_collection.push(false);
        }
        node
    }

    /// Total number of nodes, dangling ones included.
    pub fn node_count(&self) -> usize {
        self.deps.len()
    }

    /// Collection task nodes in input order.
    pub fn task_nodes(&self) -> &[NodeId] {
        &self.task_nodes
    }

    pub fn node(&self, id: TaskId) -> Option<NodeId> {
        self.index.get(id)
    }

    pub fn task_id(&self, node: NodeId) -> TaskId {
        self.index.ids()[node as usize]
    }

    /// Dependencies of a node, dangling ones included.
    pub fn dependencies(&self, node: NodeId) -> &[NodeId] {
        &self.deps[node as usize]
    }

    pub fn in_collection(&self, node: NodeId) -> bool {
        self.in_collection[node as usize]
    }

    /// Forward adjacency (dependency -> dependents) over edges whose
    /// dependency exists in the collection.
    ///
    /// A dependency listed twice yields two edges.
    pub fn dependents(&self) -> Vec<Vec<NodeId>> {
        let mut forward = vec![Vec::new(); self.node_count()];
        for &node in &self.task_nodes {
            for &dep in self.dependencies(node) {
                if self.in_collection(dep) {
                    forward[dep as usize].push(node);
                }
            }
        }
        forward
    }
}

//! Dense node indices for task ids.
//!
//! Maps arbitrary `TaskId`s to contiguous `NodeId`s so graph passes can use
//! plain vectors instead of hash lookups.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Node index inside a [`crate::graph::DependencyGraph`].
pub type NodeId = u32;

/// Two-way mapping between task ids and node indices, in insertion order.
#[derive(Debug, Clone)]
pub struct TaskIndex {
    to_node: FxHashMap<TaskId, NodeId>,
    from_node: Vec<TaskId>,
}

impl TaskIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_node: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_node: Vec::with_capacity(capacity),
        }
    }

    /// Intern a task id, returning its node index.
    /// If already interned, returns the existing index.
    pub fn intern(&mut self, id: TaskId) -> NodeId {
        if let Some(&node) = self.to_node.get(&id) {
            return node;
        }
        let node = self.from_node.len() as NodeId;
        self.from_node.push(id);
        self.to_node.insert(id, node);
        node
    }

    #[inline]
    pub fn get(&self, id: TaskId) -> Option<NodeId> {
        self.to_node.get(&id).copied()
    }

    /// Interned task ids, indexed by node.
    #[inline]
    pub fn ids(&self) -> &[TaskId] {
        &self.from_node
    }
}

impl Default for TaskIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

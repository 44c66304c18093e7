// src/dag/plan.rs

use std::collections::BTreeMap;

use crate::dag::task_id::{Action, TaskId};

#[derive(Debug, Clone)]
struct PlanNode {
    action: Action,
    /// Leaf tasks that must succeed before this one starts.
    deps: Vec<TaskId>,
    /// Leaf tasks waiting on this one.
    dependents: Vec<TaskId>,
}

/// Leaf actions of one task invocation and the order constraints between
/// them, produced by [`TaskRegistry::plan`](crate::dag::TaskRegistry::plan).
///
/// Every leaf task appears at most once.
#[derive(Debug, Clone)]
pub struct Plan {
    root: TaskId,
    nodes: BTreeMap<TaskId, PlanNode>,
    /// The invocation ends in a watch session.
    watch: bool,
}

impl Plan {
    pub(crate) fn new(root: TaskId) -> Self {
        Self {
            root,
            nodes: BTreeMap::new(),
            watch: false,
        }
    }

    pub(crate) fn set_watch(&mut self) {
        self.watch = true;
    }

    /// Add a leaf (or extend its dependencies if it is already present).
    pub(crate) fn add_node(&mut self, id: TaskId, action: Action, after: &[TaskId]) {
        self.nodes.entry(id).or_insert_with(|| PlanNode {
            action,
            deps: Vec::new(),
            dependents: Vec::new(),
        });
        for dep in after {
            self.add_edge(*dep, id);
        }
    }

    fn add_edge(&mut self, from: TaskId, to: TaskId) {
        if from == to {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            if node.deps.contains(&from) {
                return;
            }
            node.deps.push(from);
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.dependents.push(to);
        }
    }

    pub fn root(&self) -> TaskId {
        self.root
    }

    pub fn ends_in_watch(&self) -> bool {
        self.watch
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All leaf tasks, in `TaskId` order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn action_of(&self, id: TaskId) -> Option<Action> {
        self.nodes.get(&id).map(|n| n.action)
    }

    /// Immediate dependencies of a leaf.
    pub fn dependencies_of(&self, id: TaskId) -> &[TaskId] {
        self.nodes
            .get(&id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a leaf.
    pub fn dependents_of(&self, id: TaskId) -> &[TaskId] {
        self.nodes
            .get(&id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Leaves with no dependencies; these start first.
    pub fn roots(&self) -> Vec<TaskId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.deps.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Layered topological order: every leaf sits one layer after its
    /// latest dependency. Leaves caught in a cycle are left out.
    pub fn stages(&self) -> Vec<Vec<TaskId>> {
        let mut remaining: BTreeMap<TaskId, usize> = self
            .nodes
            .iter()
            .map(|(id, n)| (*id, n.deps.len()))
            .collect();
        let mut stages = Vec::new();

        loop {
            let ready: Vec<TaskId> = remaining
                .iter()
                .filter(|(_, pending)| **pending == 0)
                .map(|(id, _)| *id)
                .collect();
            if ready.is_empty() {
                break;
            }
            for id in &ready {
                remaining.remove(id);
                for dependent in self.dependents_of(*id) {
                    if let Some(pending) = remaining.get_mut(dependent) {
                        *pending = pending.saturating_sub(1);
                    }
                }
            }
            stages.push(ready);
        }

        stages
    }

    /// True when every leaf appears in [`Plan::stages`].
    pub fn is_acyclic(&self) -> bool {
        self.stages().iter().map(Vec::len).sum::<usize>() == self.nodes.len()
    }
}

//! Lazy topological walk over a task's transitive prerequisites.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::iter::FusedIterator;

use super::dependency::DependencyGraph;
use crate::domain::{Task, TaskId};

/// Every task the start task transitively depends on, yielded
/// prerequisite-before-dependent (Kahn's order, ties by ascending id).
///
/// Built from a snapshot taken while the owner's partition was read-locked,
/// so it never observes a half-applied mutation and holds no lock while
/// being consumed. Single use: once drained, re-invoke the query.
#[derive(Debug)]
pub struct TransitiveDependencies {
    /// Tasks not yet yielded.
    remaining: HashMap<TaskId, Task>,

    /// Unyielded prerequisites per task.
    pending: HashMap<TaskId, usize>,

    /// prerequisite -> dependents, restricted to the snapshot.
    unlocks: HashMap<TaskId, Vec<TaskId>>,

    ready: BTreeSet<TaskId>,
}

impl TransitiveDependencies {
    pub(crate) fn snapshot(
        graph: &DependencyGraph,
        tasks: &BTreeMap<TaskId, Task>,
        start: TaskId,
    ) -> Self {
        let reachable = graph.reachable_prerequisites(start);

        let mut remaining = HashMap::with_capacity(reachable.len());
        let mut pending = HashMap::with_capacity(reachable.len());
        let mut unlocks: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut ready = BTreeSet::new();

        for &id in &reachable {
            let Some(task) = tasks.get(&id) else {
                continue;
            };
            remaining.insert(id, task.clone());

            // Every prerequisite of a reachable task is itself reachable.
            let mut count = 0;
            for prerequisite in graph.prerequisites(id) {
                unlocks.entry(prerequisite).or_default().push(id);
                count += 1;
            }
            if count == 0 {
                ready.insert(id);
            } else {
                pending.insert(id, count);
            }
        }

        Self {
            remaining,
            pending,
            unlocks,
            ready,
        }
    }
}

impl Iterator for TransitiveDependencies {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let id = self.ready.pop_first()?;

        if let Some(dependents) = self.unlocks.remove(&id) {
            for dependent in dependents {
                if let Some(count) = self.pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        self.pending.remove(&dependent);
                        self.ready.insert(dependent);
                    }
                }
            }
        }

        self.remaining.remove(&id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Acyclic, so everything remaining is eventually yielded.
        (self.remaining.len(), Some(self.remaining.len()))
    }
}

impl ExactSizeIterator for TransitiveDependencies {}

impl FusedIterator for TransitiveDependencies {}

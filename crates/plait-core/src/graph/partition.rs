//! One owner's slice of the graph: its tasks and the edges between them.
//!
//! Edges never cross owners, so each partition is checked and mutated
//! independently. Every method here is synchronous and runs entirely under
//! the caller's lock; a method that returns `Err` has changed nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::dependency::DependencyGraph;
use super::traversal::TransitiveDependencies;
use crate::domain::{
    ConflictError, CoreError, DependencyEdge, Missing, OwnerId, Result, Task, TaskChange,
    TaskFilter, TaskId, TaskPatch, ValidationError,
};

#[derive(Debug)]
pub struct OwnerPartition {
    owner: OwnerId,
    tasks: BTreeMap<TaskId, Task>,
    deps: DependencyGraph,
}

impl OwnerPartition {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            tasks: BTreeMap::new(),
            deps: DependencyGraph::new(),
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.deps.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.deps.edges()
    }

    pub fn is_acyclic(&self) -> bool {
        self.deps.is_acyclic()
    }

    pub fn insert_task(&mut self, task: Task) {
        debug_assert_eq!(task.owner_id, self.owner);
        self.tasks.insert(task.id, task);
    }

    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks.get(&id).ok_or(CoreError::task_not_found(id))
    }

    pub fn list(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    pub fn update(&mut self, id: TaskId, patch: TaskPatch, now: DateTime<Utc>) -> Result<TaskChange> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or(CoreError::task_not_found(id))?;
        let before = task.clone();
        task.apply(patch, now);
        Ok(TaskChange {
            before,
            after: task.clone(),
        })
    }

    /// Remove the task together with all of its edges.
    pub fn remove_task(&mut self, id: TaskId) -> Result<(Task, Vec<DependencyEdge>)> {
        let task = self
            .tasks
            .remove(&id)
            .ok_or(CoreError::task_not_found(id))?;
        let edges = self.deps.remove_node(id);
        Ok((task, edges))
    }

    /// Checks run in a fixed order: existence, self-dependency, duplicate,
    /// cycle. The insert happens only after all of them pass.
    pub fn add_dependency(&mut self, dependent: TaskId, prerequisite: TaskId) -> Result<()> {
        self.task(dependent)?;
        self.task(prerequisite)?;

        if dependent == prerequisite {
            return Err(ValidationError::SelfDependency(dependent).into());
        }

        if self.deps.contains(dependent, prerequisite) {
            return Err(ConflictError::DuplicateEdge {
                dependent,
                prerequisite,
            }
            .into());
        }

        // If the prerequisite already (transitively) depends on the dependent,
        // the new edge would close that path into a cycle.
        if let Some(path) = self.deps.find_path(prerequisite, dependent) {
            return Err(ConflictError::CycleDetected {
                dependent,
                prerequisite,
                path,
            }
            .into());
        }

        self.deps.insert(dependent, prerequisite);
        Ok(())
    }

    pub fn remove_dependency(&mut self, dependent: TaskId, prerequisite: TaskId) -> Result<()> {
        if self.deps.remove(dependent, prerequisite) {
            Ok(())
        } else {
            Err(Missing::Edge {
                dependent,
                prerequisite,
            }
            .into())
        }
    }

    pub fn dependencies(&self, id: TaskId) -> Result<Vec<Task>> {
        self.task(id)?;
        Ok(self.collect(self.deps.prerequisites(id)))
    }

    pub fn dependents(&self, id: TaskId) -> Result<Vec<Task>> {
        self.task(id)?;
        Ok(self.collect(self.deps.dependents(id)))
    }

    pub fn transitive_dependencies(&self, id: TaskId) -> Result<TransitiveDependencies> {
        self.task(id)?;
        Ok(TransitiveDependencies::snapshot(&self.deps, &self.tasks, id))
    }

    fn collect(&self, ids: impl Iterator<Item = TaskId>) -> Vec<Task> {
        ids.filter_map(|id| self.tasks.get(&id)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, NewTask, PriorityId, TaskStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn partition_with(ids: &[u64]) -> OwnerPartition {
        let owner = OwnerId::new(1);
        let mut partition = OwnerPartition::new(owner);
        for &n in ids {
            partition.insert_task(Task::create(
                TaskId::new(n),
                owner,
                NewTask::new(format!("t{n}"), PriorityId::new(1)),
                now(),
            ));
        }
        partition
    }

    fn t(n: u64) -> TaskId {
        TaskId::new(n)
    }

    #[test]
    fn missing_endpoint_is_not_found() {
        let mut p = partition_with(&[1]);
        let err = p.add_dependency(t(1), t(2)).unwrap_err();
        assert_eq!(err, CoreError::task_not_found(t(2)));
    }

    #[test]
    fn missing_wins_over_self_dependency() {
        let mut p = partition_with(&[]);
        let err = p.add_dependency(t(1), t(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn self_dependency_is_validation_error() {
        let mut p = partition_with(&[1]);
        let err = p.add_dependency(t(1), t(1)).unwrap_err();
        assert_eq!(err, ValidationError::SelfDependency(t(1)).into());
        assert_eq!(p.edge_count(), 0);
    }

    #[test]
    fn duplicate_edge_is_conflict() {
        let mut p = partition_with(&[1, 2]);
        p.add_dependency(t(1), t(2)).unwrap();
        let err = p.add_dependency(t(1), t(2)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict(ConflictError::DuplicateEdge { .. })
        ));
        assert_eq!(p.edge_count(), 1);
    }

    #[test]
    fn reverse_edge_is_cycle() {
        let mut p = partition_with(&[1, 2]);
        p.add_dependency(t(1), t(2)).unwrap();

        let err = p.add_dependency(t(2), t(1)).unwrap_err();
        assert_eq!(
            err,
            ConflictError::CycleDetected {
                dependent: t(2),
                prerequisite: t(1),
                path: vec![t(1), t(2)],
            }
            .into()
        );
        assert_eq!(p.edge_count(), 1);
    }

    #[test]
    fn closing_a_chain_is_cycle_and_changes_nothing() {
        let mut p = partition_with(&[1, 2, 3]);
        p.add_dependency(t(1), t(2)).unwrap();
        p.add_dependency(t(2), t(3)).unwrap();
        let before: Vec<_> = p.edges().collect();

        let err = p.add_dependency(t(3), t(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let mut after: Vec<_> = p.edges().collect();
        let mut before = before;
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert!(p.is_acyclic());
    }

    #[test]
    fn remove_task_cascades_edges() {
        let mut p = partition_with(&[1, 2, 3]);
        p.add_dependency(t(1), t(2)).unwrap();
        p.add_dependency(t(2), t(3)).unwrap();

        let (removed, edges) = p.remove_task(t(2)).unwrap();
        assert_eq!(removed.id, t(2));
        assert_eq!(edges.len(), 2);
        assert_eq!(p.edge_count(), 0);
        assert!(p.dependencies(t(1)).unwrap().is_empty());
        assert!(p.dependents(t(3)).unwrap().is_empty());
    }

    #[test]
    fn remove_missing_edge_is_not_found() {
        let mut p = partition_with(&[1, 2]);
        let err = p.remove_dependency(t(1), t(2)).unwrap_err();
        assert_eq!(
            err,
            Missing::Edge {
                dependent: t(1),
                prerequisite: t(2),
            }
            .into()
        );
    }

    #[test]
    fn update_returns_before_and_after() {
        let mut p = partition_with(&[1]);
        let later = now() + chrono::Duration::hours(1);
        let change = p
            .update(
                t(1),
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..TaskPatch::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(change.before.status, TaskStatus::Open);
        assert_eq!(change.after.status, TaskStatus::Completed);
        assert_eq!(p.task(t(1)).unwrap().updated_at, later);
    }

    #[test]
    fn list_applies_filter_in_id_order() {
        let mut p = partition_with(&[3, 1, 2]);
        p.update(
            t(2),
            TaskPatch {
                status: Some(TaskStatus::Blocked),
                ..TaskPatch::default()
            },
            now(),
        )
        .unwrap();

        let all: Vec<_> = p.list(TaskFilter::default()).iter().map(|t| t.id).collect();
        assert_eq!(all, vec![t(1), t(2), t(3)]);

        let blocked = p.list(TaskFilter {
            status: Some(TaskStatus::Blocked),
            priority_id: None,
        });
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].id, t(2));
    }
}

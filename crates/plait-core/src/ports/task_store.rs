//! TaskStore port - the owner of tasks, edges and the priority catalog.
//!
//! An implementation (in-memory here, a database elsewhere) must make each
//! call atomic: a structural error leaves no partial state, and no reader
//! observes a half-applied edge insert or a task whose edges have not yet
//! been removed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewPriority, NewTask, OwnerId, Priority, PriorityId, Result, Task, TaskChange, TaskFilter,
    TaskId, TaskPatch,
};
use crate::graph::TransitiveDependencies;
use crate::observability::GraphCounts;

#[async_trait]
pub trait TaskStore: Send + Sync {
    // ---- priority catalog ----

    async fn create_priority(&self, fields: NewPriority) -> Result<Priority>;

    async fn get_priority(&self, id: PriorityId) -> Result<Priority>;

    async fn list_priorities(&self) -> Result<Vec<Priority>>;

    // ---- tasks ----

    /// Insert a task with a fresh id. Fails `NotFound` if the priority is
    /// unknown.
    async fn add_task(&self, owner: OwnerId, fields: NewTask, now: DateTime<Utc>) -> Result<Task>;

    async fn get_task(&self, task: TaskId, owner: OwnerId) -> Result<Task>;

    async fn list_tasks(&self, owner: OwnerId, filter: TaskFilter) -> Result<Vec<Task>>;

    async fn update_task(
        &self,
        task: TaskId,
        owner: OwnerId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<TaskChange>;

    /// Remove the task and every edge it is an endpoint of, as one step.
    async fn remove_task(&self, task: TaskId, owner: OwnerId) -> Result<()>;

    // ---- edges ----

    /// Insert `dependent -> prerequisite` after the existence, self, duplicate
    /// and cycle checks, all under one critical section.
    async fn add_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<()>;

    async fn remove_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<()>;

    // ---- queries ----

    /// Direct prerequisites of `task`, ordered by id.
    async fn dependencies(&self, task: TaskId) -> Result<Vec<Task>>;

    /// Direct dependents of `task`, ordered by id.
    async fn dependents(&self, task: TaskId) -> Result<Vec<Task>>;

    /// Everything `task` transitively depends on, prerequisites first.
    async fn transitive_dependencies(&self, task: TaskId) -> Result<TransitiveDependencies>;

    async fn counts(&self) -> GraphCounts;
}

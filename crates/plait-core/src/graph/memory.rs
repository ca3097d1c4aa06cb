//! In-memory task store.
//!
//! Locking:
//! - one `RwLock<OwnerPartition>` per owner, so structural checks for
//!   different owners never contend
//! - a directory mapping owners to partitions and tasks to owners
//! - the directory lock is never held while waiting on a partition lock;
//!   a partition holder may take the directory lock briefly
//!
//! A partition write guard covers the whole check-then-insert of an edge, so
//! two concurrent inserts that together would close a cycle are serialized
//! and the second one sees the first.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::catalog::PriorityCatalog;
use super::partition::OwnerPartition;
use super::traversal::TransitiveDependencies;
use crate::domain::{
    CoreError, Missing, NewPriority, NewTask, OwnerId, Priority, PriorityId, Result, Task,
    TaskChange, TaskFilter, TaskId, TaskPatch,
};
use crate::observability::GraphCounts;
use crate::ports::{IdGenerator, TaskStore};

type SharedPartition = Arc<RwLock<OwnerPartition>>;

#[derive(Default)]
struct Directory {
    partitions: HashMap<OwnerId, SharedPartition>,
    task_owners: HashMap<TaskId, OwnerId>,
}

pub struct InMemoryTaskStore {
    ids: Arc<dyn IdGenerator>,
    catalog: RwLock<PriorityCatalog>,
    directory: RwLock<Directory>,
}

impl InMemoryTaskStore {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            catalog: RwLock::new(PriorityCatalog::new()),
            directory: RwLock::new(Directory::default()),
        }
    }

    async fn partition(&self, owner: OwnerId) -> Option<SharedPartition> {
        self.directory.read().await.partitions.get(&owner).cloned()
    }

    async fn partition_or_create(&self, owner: OwnerId) -> SharedPartition {
        let mut directory = self.directory.write().await;
        Arc::clone(
            directory
                .partitions
                .entry(owner)
                .or_insert_with(|| Arc::new(RwLock::new(OwnerPartition::new(owner)))),
        )
    }

    /// Partition of an owner who must already hold `task`.
    async fn owned_partition(&self, owner: OwnerId, task: TaskId) -> Result<SharedPartition> {
        self.partition(owner)
            .await
            .ok_or(CoreError::task_not_found(task))
    }

    /// Partition holding `task`, whoever owns it.
    async fn locate(&self, task: TaskId) -> Result<SharedPartition> {
        let directory = self.directory.read().await;
        directory
            .task_owners
            .get(&task)
            .and_then(|owner| directory.partitions.get(owner))
            .cloned()
            .ok_or(CoreError::task_not_found(task))
    }

    async fn ensure_priority(&self, id: PriorityId) -> Result<()> {
        if self.catalog.read().await.contains(id) {
            Ok(())
        } else {
            Err(Missing::Priority(id).into())
        }
    }

    /// True when no owner's edges contain a cycle.
    pub async fn is_acyclic(&self) -> bool {
        for partition in self.all_partitions().await {
            if !partition.read().await.is_acyclic() {
                return false;
            }
        }
        true
    }

    async fn all_partitions(&self) -> Vec<SharedPartition> {
        self.directory
            .read()
            .await
            .partitions
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_priority(&self, fields: NewPriority) -> Result<Priority> {
        fields.validate()?;
        let mut catalog = self.catalog.write().await;
        catalog.insert(self.ids.next_priority_id(), fields)
    }

    async fn get_priority(&self, id: PriorityId) -> Result<Priority> {
        self.catalog.read().await.get(id).cloned()
    }

    async fn list_priorities(&self) -> Result<Vec<Priority>> {
        Ok(self.catalog.read().await.list())
    }

    async fn add_task(&self, owner: OwnerId, fields: NewTask, now: DateTime<Utc>) -> Result<Task> {
        fields.validate()?;
        self.ensure_priority(fields.priority_id).await?;

        let shared = self.partition_or_create(owner).await;
        let mut partition = shared.write().await;

        let task = Task::create(self.ids.next_task_id(), owner, fields, now);
        partition.insert_task(task.clone());
        // Published while the partition is still locked, so a reader that
        // resolves the id waits for the insert to finish.
        self.directory.write().await.task_owners.insert(task.id, owner);

        Ok(task)
    }

    async fn get_task(&self, task: TaskId, owner: OwnerId) -> Result<Task> {
        let shared = self.owned_partition(owner, task).await?;
        let partition = shared.read().await;
        partition.task(task).cloned()
    }

    async fn list_tasks(&self, owner: OwnerId, filter: TaskFilter) -> Result<Vec<Task>> {
        match self.partition(owner).await {
            Some(shared) => Ok(shared.read().await.list(filter)),
            None => Ok(Vec::new()),
        }
    }

    async fn update_task(
        &self,
        task: TaskId,
        owner: OwnerId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<TaskChange> {
        patch.validate()?;
        if let Some(priority_id) = patch.priority_id {
            self.ensure_priority(priority_id).await?;
        }

        let shared = self.owned_partition(owner, task).await?;
        let mut partition = shared.write().await;
        partition.update(task, patch, now)
    }

    async fn remove_task(&self, task: TaskId, owner: OwnerId) -> Result<()> {
        let shared = self.owned_partition(owner, task).await?;
        let mut partition = shared.write().await;

        let (_, edges) = partition.remove_task(task)?;
        self.directory.write().await.task_owners.remove(&task);

        debug!(task = %task, edges = edges.len(), "removed task");
        Ok(())
    }

    async fn add_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<()> {
        let shared = self.owned_partition(owner, dependent).await?;
        let mut partition = shared.write().await;
        partition.add_dependency(dependent, prerequisite)
    }

    async fn remove_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<()> {
        let shared = self.partition(owner).await.ok_or(Missing::Edge {
            dependent,
            prerequisite,
        })?;
        let mut partition = shared.write().await;
        partition.remove_dependency(dependent, prerequisite)
    }

    async fn dependencies(&self, task: TaskId) -> Result<Vec<Task>> {
        let shared = self.locate(task).await?;
        let partition = shared.read().await;
        partition.dependencies(task)
    }

    async fn dependents(&self, task: TaskId) -> Result<Vec<Task>> {
        let shared = self.locate(task).await?;
        let partition = shared.read().await;
        partition.dependents(task)
    }

    async fn transitive_dependencies(&self, task: TaskId) -> Result<TransitiveDependencies> {
        let shared = self.locate(task).await?;
        let partition = shared.read().await;
        partition.transitive_dependencies(task)
    }

    async fn counts(&self) -> GraphCounts {
        let partitions = self.all_partitions().await;

        let mut counts = GraphCounts::default();
        for shared in partitions {
            let partition = shared.read().await;
            if partition.task_count() > 0 {
                counts.owners += 1;
            }
            counts.tasks += partition.task_count();
            counts.edges += partition.edge_count();
        }
        counts
    }
}

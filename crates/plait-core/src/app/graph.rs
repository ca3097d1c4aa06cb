//! TaskGraph - the facade the API layer calls.
//!
//! Structural work is delegated to the [`TaskStore`]; scoring runs after a
//! committed create or update as a bounded, best-effort side step. A slow or
//! failing scorer degrades the reply to `ScoreOutcome::Unavailable`, it never
//! undoes the mutation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{
    DependencyEdge, NewPriority, NewTask, OwnerId, Priority, PriorityId, Result, ScoreOutcome,
    Scored, ScoringUnavailable, Task, TaskFilter, TaskId, TaskPatch,
};
use crate::graph::TransitiveDependencies;
use crate::observability::GraphCounts;
use crate::ports::{Clock, Scorer, TaskStore};

pub struct TaskGraph {
    store: Arc<dyn TaskStore>,
    scorer: Arc<dyn Scorer>,
    clock: Arc<dyn Clock>,
    scoring_timeout: Duration,
}

impl TaskGraph {
    pub fn new(
        store: Arc<dyn TaskStore>,
        scorer: Arc<dyn Scorer>,
        clock: Arc<dyn Clock>,
        scoring_timeout: Duration,
    ) -> Self {
        Self {
            store,
            scorer,
            clock,
            scoring_timeout,
        }
    }

    pub async fn create_priority(&self, fields: NewPriority) -> Result<Priority> {
        let priority = self.store.create_priority(fields).await?;
        debug!(priority = %priority.id, name = %priority.name, weight = priority.weight, "priority created");
        Ok(priority)
    }

    pub async fn get_priority(&self, id: PriorityId) -> Result<Priority> {
        self.store.get_priority(id).await
    }

    pub async fn list_priorities(&self) -> Result<Vec<Priority>> {
        self.store.list_priorities().await
    }

    pub async fn add_task(&self, owner: OwnerId, fields: NewTask) -> Result<Scored<Task>> {
        let now = self.clock.now();
        let task = self.store.add_task(owner, fields, now).await?;
        debug!(task = %task.id, %owner, "task created");

        let score = self.score(&task, now).await;
        Ok(Scored { value: task, score })
    }

    pub async fn get_task(&self, task: TaskId, owner: OwnerId) -> Result<Task> {
        self.store.get_task(task, owner).await
    }

    pub async fn list_tasks(&self, owner: OwnerId, filter: TaskFilter) -> Result<Vec<Task>> {
        self.store.list_tasks(owner, filter).await
    }

    /// Apply a patch. Rescores only when priority or due date changed.
    pub async fn update_task(
        &self,
        task: TaskId,
        owner: OwnerId,
        patch: TaskPatch,
    ) -> Result<Scored<Task>> {
        let now = self.clock.now();
        let change = self.store.update_task(task, owner, patch, now).await?;
        debug!(%task, %owner, status = %change.after.status, "task updated");

        let score = if change.signals_changed() {
            self.score(&change.after, now).await
        } else {
            ScoreOutcome::Unchanged
        };
        Ok(Scored {
            value: change.after,
            score,
        })
    }

    pub async fn remove_task(&self, task: TaskId, owner: OwnerId) -> Result<()> {
        self.store.remove_task(task, owner).await
    }

    pub async fn add_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<DependencyEdge> {
        self.store
            .add_dependency(dependent, prerequisite, owner)
            .await?;
        let edge = DependencyEdge::new(dependent, prerequisite);
        debug!(%edge, %owner, "dependency added");
        Ok(edge)
    }

    pub async fn remove_dependency(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
        owner: OwnerId,
    ) -> Result<()> {
        self.store
            .remove_dependency(dependent, prerequisite, owner)
            .await?;
        debug!(%dependent, %prerequisite, %owner, "dependency removed");
        Ok(())
    }

    pub async fn dependencies(&self, task: TaskId) -> Result<Vec<Task>> {
        self.store.dependencies(task).await
    }

    pub async fn dependents(&self, task: TaskId) -> Result<Vec<Task>> {
        self.store.dependents(task).await
    }

    pub async fn transitive_dependencies(&self, task: TaskId) -> Result<TransitiveDependencies> {
        self.store.transitive_dependencies(task).await
    }

    /// Score a stored task now, without mutating it.
    pub async fn score_task(&self, task: TaskId, owner: OwnerId) -> Result<ScoreOutcome> {
        let task = self.store.get_task(task, owner).await?;
        Ok(self.score(&task, self.clock.now()).await)
    }

    pub async fn counts(&self) -> GraphCounts {
        self.store.counts().await
    }

    /// The weight lookup and the scorer call share one deadline.
    async fn score(&self, task: &Task, now: DateTime<Utc>) -> ScoreOutcome {
        let call = async {
            let priority = self
                .store
                .get_priority(task.priority_id)
                .await
                .map_err(|err| ScoringUnavailable::Failed(err.to_string()))?;
            self.scorer.score(priority.weight, task.due_at, now).await
        };

        match tokio::time::timeout(self.scoring_timeout, call).await {
            Ok(Ok(score)) => ScoreOutcome::Scored { score },
            Ok(Err(reason)) => self.unavailable(task.id, reason),
            Err(_) => self.unavailable(task.id, ScoringUnavailable::TimedOut(self.scoring_timeout)),
        }
    }

    fn unavailable(&self, task: TaskId, reason: ScoringUnavailable) -> ScoreOutcome {
        warn!(%task, %reason, "priority score unavailable");
        ScoreOutcome::Unavailable { reason }
    }
}

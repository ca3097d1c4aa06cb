//! Core - the admission gate in front of the task graph.

use std::sync::Arc;

use tracing::debug;

use super::graph::TaskGraph;
use super::operation::{Operation, Reply, RequestContext};
use crate::admission::AdmissionGate;
use crate::domain::{NewPriority, OwnerId, Result};
use crate::ports::Clock;

pub struct Core {
    gate: AdmissionGate,
    graph: TaskGraph,
    clock: Arc<dyn Clock>,
}

impl Core {
    pub(crate) fn new(gate: AdmissionGate, graph: TaskGraph, clock: Arc<dyn Clock>) -> Self {
        Self { gate, graph, clock }
    }

    pub fn builder() -> super::CoreBuilder {
        super::CoreBuilder::new()
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Admit the request, then run it. A denied request never reaches the
    /// graph.
    pub async fn execute(&self, ctx: &RequestContext, op: Operation) -> Result<Reply> {
        let remaining = self.gate.check(ctx.route, &ctx.client, self.clock.now())?;
        debug!(client = %ctx.client, route = %ctx.route, op = op.name(), remaining, "admitted");
        self.dispatch(ctx.owner, op).await
    }

    async fn dispatch(&self, owner: OwnerId, op: Operation) -> Result<Reply> {
        let graph = &self.graph;
        let reply = match op {
            Operation::CreatePriority { name, weight } => Reply::Priority {
                priority: graph.create_priority(NewPriority::new(name, weight)).await?,
            },
            Operation::GetPriority { priority } => Reply::Priority {
                priority: graph.get_priority(priority).await?,
            },
            Operation::ListPriorities => Reply::Priorities {
                priorities: graph.list_priorities().await?,
            },
            Operation::AddTask { task } => {
                let scored = graph.add_task(owner, task).await?;
                Reply::ScoredTask {
                    task: scored.value,
                    score: scored.score,
                }
            }
            Operation::GetTask { task } => Reply::Task {
                task: graph.get_task(task, owner).await?,
            },
            Operation::ListTasks { filter } => Reply::Tasks {
                tasks: graph.list_tasks(owner, filter).await?,
            },
            Operation::UpdateTask { task, patch } => {
                let scored = graph.update_task(task, owner, patch).await?;
                Reply::ScoredTask {
                    task: scored.value,
                    score: scored.score,
                }
            }
            Operation::RemoveTask { task } => {
                graph.remove_task(task, owner).await?;
                Reply::Removed
            }
            Operation::AddDependency {
                dependent,
                prerequisite,
            } => Reply::Edge {
                edge: graph.add_dependency(dependent, prerequisite, owner).await?,
            },
            Operation::RemoveDependency {
                dependent,
                prerequisite,
            } => {
                graph
                    .remove_dependency(dependent, prerequisite, owner)
                    .await?;
                Reply::Removed
            }
            // Queries are keyed by task alone; the owner must hold it.
            Operation::GetDependencies { task } => {
                graph.get_task(task, owner).await?;
                Reply::Tasks {
                    tasks: graph.dependencies(task).await?,
                }
            }
            Operation::GetDependents { task } => {
                graph.get_task(task, owner).await?;
                Reply::Tasks {
                    tasks: graph.dependents(task).await?,
                }
            }
            Operation::GetTransitiveDependencies { task } => {
                graph.get_task(task, owner).await?;
                Reply::Tasks {
                    tasks: graph.transitive_dependencies(task).await?.collect(),
                }
            }
            Operation::ScoreTask { task } => Reply::Score {
                task,
                score: graph.score_task(task, owner).await?,
            },
            Operation::Counts => Reply::Counts {
                counts: graph.counts().await,
            },
        };
        Ok(reply)
    }
}

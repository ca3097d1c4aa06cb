//! Requests and replies as data, so a transport (or a replay script) can
//! drive the core without knowing its method signatures.

use serde::{Deserialize, Serialize};

use crate::admission::Route;
use crate::domain::{
    DependencyEdge, NewTask, OwnerId, Priority, PriorityId, ScoreOutcome, Task, TaskFilter,
    TaskId, TaskPatch,
};
use crate::observability::GraphCounts;

/// Who is asking. `owner` is already authenticated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Admission key, typically the remote address.
    pub client: String,
    #[serde(default)]
    pub route: Route,
    pub owner: OwnerId,
}

impl RequestContext {
    pub fn new(client: impl Into<String>, owner: OwnerId) -> Self {
        Self {
            client: client.into(),
            route: Route::General,
            owner,
        }
    }

    pub fn on_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreatePriority {
        name: String,
        weight: u32,
    },
    GetPriority {
        priority: PriorityId,
    },
    ListPriorities,
    AddTask {
        task: NewTask,
    },
    GetTask {
        task: TaskId,
    },
    ListTasks {
        #[serde(default)]
        filter: TaskFilter,
    },
    UpdateTask {
        task: TaskId,
        patch: TaskPatch,
    },
    RemoveTask {
        task: TaskId,
    },
    AddDependency {
        dependent: TaskId,
        prerequisite: TaskId,
    },
    RemoveDependency {
        dependent: TaskId,
        prerequisite: TaskId,
    },
    GetDependencies {
        task: TaskId,
    },
    GetDependents {
        task: TaskId,
    },
    GetTransitiveDependencies {
        task: TaskId,
    },
    ScoreTask {
        task: TaskId,
    },
    Counts,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreatePriority { .. } => "create_priority",
            Operation::GetPriority { .. } => "get_priority",
            Operation::ListPriorities => "list_priorities",
            Operation::AddTask { .. } => "add_task",
            Operation::GetTask { .. } => "get_task",
            Operation::ListTasks { .. } => "list_tasks",
            Operation::UpdateTask { .. } => "update_task",
            Operation::RemoveTask { .. } => "remove_task",
            Operation::AddDependency { .. } => "add_dependency",
            Operation::RemoveDependency { .. } => "remove_dependency",
            Operation::GetDependencies { .. } => "get_dependencies",
            Operation::GetDependents { .. } => "get_dependents",
            Operation::GetTransitiveDependencies { .. } => "get_transitive_dependencies",
            Operation::ScoreTask { .. } => "score_task",
            Operation::Counts => "counts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Priority { priority: Priority },
    Priorities { priorities: Vec<Priority> },
    Task { task: Task },
    /// A created or updated task with its scoring outcome.
    ScoredTask { task: Task, score: ScoreOutcome },
    Tasks { tasks: Vec<Task> },
    Edge { edge: DependencyEdge },
    Removed,
    Score { task: TaskId, score: ScoreOutcome },
    Counts { counts: GraphCounts },
}

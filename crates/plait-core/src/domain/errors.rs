//! Errors and their operational classification.
//!
//! Every fallible core operation returns [`CoreError`]. The API layer maps
//! [`ErrorKind`] to its own response codes; the core never does.

use std::time::Duration;

use thiserror::Error;

use super::ids::{PriorityId, TaskId};

/// Coarse classification used by callers to pick a user-facing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, including a self-dependency.
    Validation,
    /// Well-formed input that contradicts current state (cycle, duplicate).
    Conflict,
    /// Missing entity, or an entity owned by someone else.
    NotFound,
    /// Denied at the admission gate.
    RateLimited,
    /// Soft failure of a best-effort step (scoring).
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("title must be at most {max} characters (got {len})")]
    TitleTooLong { len: usize, max: usize },

    #[error("priority name cannot be empty")]
    EmptyPriorityName,

    #[error("priority weight must be positive")]
    NonPositiveWeight,

    #[error("unknown task status '{0}'")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    /// `path` runs from the prerequisite down to the dependent, i.e. the
    /// existing chain the new edge would close into a cycle.
    #[error("{dependent} depending on {prerequisite} would close a cycle: {}", render_path(.path))]
    CycleDetected {
        dependent: TaskId,
        prerequisite: TaskId,
        path: Vec<TaskId>,
    },

    #[error("{dependent} already depends on {prerequisite}")]
    DuplicateEdge {
        dependent: TaskId,
        prerequisite: TaskId,
    },

    #[error("priority named '{0}' already exists")]
    DuplicatePriority(String),
}

/// What could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Missing {
    #[error("task {0}")]
    Task(TaskId),

    #[error("dependency {dependent} -> {prerequisite}")]
    Edge {
        dependent: TaskId,
        prerequisite: TaskId,
    },

    #[error("priority {0}")]
    Priority(PriorityId),
}

/// Scoring could not complete in time or the scorer failed.
///
/// Never aborts the mutation that triggered the scoring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringUnavailable {
    #[error("scoring timed out after {0:?}")]
    TimedOut(Duration),

    #[error("scorer failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("not found: {0}")]
    NotFound(#[from] Missing),

    #[error("rate limit exceeded for client '{client}', retry after {retry_after:?}")]
    RateLimitExceeded {
        client: String,
        retry_after: Duration,
    },

    #[error(transparent)]
    ScoringUnavailable(#[from] ScoringUnavailable),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::RateLimitExceeded { .. } => ErrorKind::RateLimited,
            CoreError::ScoringUnavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn task_not_found(id: TaskId) -> Self {
        CoreError::NotFound(Missing::Task(id))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

fn render_path(path: &[TaskId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

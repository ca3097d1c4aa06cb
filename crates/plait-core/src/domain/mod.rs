//! Domain model (ids, tasks, priorities, edges, scores, errors).
//!
//! Architecture-agnostic: nothing here knows about locks, stores or clocks.

pub mod edge;
pub mod errors;
pub mod ids;
pub mod priority;
pub mod score;
pub mod task;

pub use edge::DependencyEdge;
pub use errors::{
    ConflictError, CoreError, ErrorKind, Missing, Result, ScoringUnavailable, ValidationError,
};
pub use ids::{OwnerId, PriorityId, TaskId};
pub use priority::{NewPriority, Priority};
pub use score::{MAX_SCORE, PriorityScore, ScoreOutcome, Scored};
pub use task::{NewTask, Task, TaskChange, TaskFilter, TaskPatch, TaskStatus};

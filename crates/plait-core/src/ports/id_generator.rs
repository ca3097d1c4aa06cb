//! IdGenerator port - id allocation.
//!
//! Stores ask the generator for fresh ids so a durable store can hand out
//! ids from its own sequence while tests keep them predictable.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{PriorityId, TaskId};

pub trait IdGenerator: Send + Sync {
    fn next_task_id(&self) -> TaskId;

    fn next_priority_id(&self) -> PriorityId;
}

/// Monotonic counters starting at 1, one per id space.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next_task: AtomicU64,
    next_priority: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next_task: AtomicU64::new(first),
            next_priority: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_task_id(&self) -> TaskId {
        TaskId::new(self.next_task.fetch_add(1, Ordering::Relaxed))
    }

    fn next_priority_id(&self) -> PriorityId {
        PriorityId::new(self.next_priority.fetch_add(1, Ordering::Relaxed))
    }
}

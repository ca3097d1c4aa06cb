use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TaskId;

/// "`dependent` depends on `prerequisite`".
///
/// Unique per ordered pair. Has no lifecycle of its own: it disappears with
/// either endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub dependent: TaskId,
    pub prerequisite: TaskId,
}

impl DependencyEdge {
    pub fn new(dependent: TaskId, prerequisite: TaskId) -> Self {
        Self {
            dependent,
            prerequisite,
        }
    }

    pub fn touches(&self, task: TaskId) -> bool {
        self.dependent == task || self.prerequisite == task
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.dependent, self.prerequisite)
    }
}

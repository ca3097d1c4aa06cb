//! Priority catalog entries.

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::ids::PriorityId;

/// A named weight. Tasks reference priorities by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: PriorityId,
    pub name: String,
    pub weight: u32,
}

/// Fields supplied when creating a priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPriority {
    pub name: String,
    pub weight: u32,
}

impl NewPriority {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyPriorityName);
        }
        if self.weight == 0 {
            return Err(ValidationError::NonPositiveWeight);
        }
        Ok(())
    }
}

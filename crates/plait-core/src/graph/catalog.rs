//! Priority catalog: named weights shared by all owners.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{ConflictError, Missing, NewPriority, Priority, PriorityId, Result};

#[derive(Debug, Default)]
pub struct PriorityCatalog {
    by_id: BTreeMap<PriorityId, Priority>,
    by_name: HashMap<String, PriorityId>,
}

impl PriorityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a validated priority. Names are unique (compared trimmed).
    pub fn insert(&mut self, id: PriorityId, fields: NewPriority) -> Result<Priority> {
        let name = fields.name.trim().to_string();
        if self.by_name.contains_key(&name) {
            return Err(ConflictError::DuplicatePriority(name).into());
        }
        let priority = Priority {
            id,
            name: name.clone(),
            weight: fields.weight,
        };
        self.by_name.insert(name, id);
        self.by_id.insert(id, priority.clone());
        Ok(priority)
    }

    pub fn get(&self, id: PriorityId) -> Result<&Priority> {
        self.by_id.get(&id).ok_or(Missing::Priority(id).into())
    }

    pub fn contains(&self, id: PriorityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Heaviest first, then by id.
    pub fn list(&self) -> Vec<Priority> {
        let mut all: Vec<Priority> = self.by_id.values().cloned().collect();
        all.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.id.cmp(&b.id)));
        all
    }
}

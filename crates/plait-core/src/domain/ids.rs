//! Domain identifiers (strongly-typed IDs).
//!
//! Every entity is keyed by an integer, but tasks, owners and priorities live
//! in separate id spaces. `Id<T>` carries a zero-sized marker so the compiler
//! rejects a `TaskId` where an `OwnerId` is expected, while the runtime
//! representation stays a plain `u64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for each id space.
///
/// Provides the prefix used by `Display` ("task-", "owner-", "priority-").
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic integer id.
///
/// Serialized transparently as the bare integer so wire formats and stores
/// see `7`, not `{"value": 7}`.
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(self) -> u64 {
        self.value
    }
}

// Manual impls: derives would put bounds on `T`, and the marker types are
// uninhabited enums that never need them.

impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {}

impl IdMarker for Owner {
    fn prefix() -> &'static str {
        "owner-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {}

impl IdMarker for Priority {
    fn prefix() -> &'static str {
        "priority-"
    }
}

// ========================================
// Type aliases
// ========================================

/// Identifier of a task (node of the dependency graph).
pub type TaskId = Id<Task>;

/// Identifier of the owner a task belongs to. Resolved by the caller's
/// authentication layer; the core never issues owner ids.
pub type OwnerId = Id<Owner>;

/// Identifier of a priority in the catalog.
pub type PriorityId = Id<Priority>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        assert_eq!(TaskId::new(7).to_string(), "task-7");
        assert_eq!(OwnerId::new(3).to_string(), "owner-3");
        assert_eq!(PriorityId::new(2).to_string(), "priority-2");
    }

    #[test]
    fn ids_order_by_value() {
        let mut ids = vec![TaskId::new(3), TaskId::new(1), TaskId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)]);
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&TaskId::new(42)).unwrap();
        assert_eq!(json, "42");

        let back: TaskId = serde_json::from_str("42").unwrap();
        assert_eq!(back, TaskId::new(42));
    }

    #[test]
    fn marker_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<TaskId>(), size_of::<u64>());
        assert_eq!(size_of::<OwnerId>(), size_of::<u64>());
    }
}

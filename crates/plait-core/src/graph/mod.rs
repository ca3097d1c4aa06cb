//! The dependency graph: per-owner partitions, the priority catalog and
//! the in-memory [`TaskStore`](crate::ports::TaskStore).

mod catalog;
mod dependency;
mod memory;
mod partition;
mod traversal;

pub use catalog::PriorityCatalog;
pub use dependency::DependencyGraph;
pub use memory::InMemoryTaskStore;
pub use partition::OwnerPartition;
pub use traversal::TransitiveDependencies;

//! Application layer: ports and components wired into a usable core.
//!
//! - **CoreBuilder**: wiring and startup validation
//! - **Core**: admission, then dispatch of an [`Operation`]
//! - **TaskGraph**: graph operations plus best-effort scoring

pub mod builder;
pub mod runtime;
pub mod graph;
pub mod operation;

pub use self::builder::{BuildError, CoreBuilder};
pub use self::runtime::Core;
pub use self::graph::TaskGraph;
pub use self::operation::{Operation, Reply, RequestContext};

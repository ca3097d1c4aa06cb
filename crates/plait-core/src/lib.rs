//! plait-core
//!
//! A task dependency graph that stays acyclic under concurrent mutation,
//! a deterministic priority score, and a per-client admission limiter.
//!
//! # Modules
//! - **domain**: ids, tasks, priorities, edges, scores, errors
//! - **ports**: seams (TaskStore, Scorer, Clock, IdGenerator)
//! - **graph**: per-owner adjacency, cycle search, the in-memory store
//! - **scoring**: the score engine
//! - **admission**: fixed-window limiters and the gate that holds them
//! - **app**: builder, facade and request dispatch
//! - **config**: TOML configuration
//! - **observability**: logging setup and counters
//!
//! ```ignore
//! let core = Core::builder().config(config).build()?;
//! let ctx = RequestContext::new("10.0.0.1", OwnerId::new(1));
//! let reply = core.execute(&ctx, Operation::Counts).await?;
//! ```

pub mod admission;
pub mod app;
pub mod config;
pub mod domain;
pub mod graph;
pub mod observability;
pub mod ports;
pub mod scoring;

pub use app::{BuildError, Core, CoreBuilder, Operation, Reply, RequestContext, TaskGraph};
pub use config::{ConfigError, CoreConfig};
pub use domain::{CoreError, ErrorKind};

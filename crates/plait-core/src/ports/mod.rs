//! Ports - seams to the outside world.
//!
//! Each trait is `Send + Sync` so implementations can sit behind
//! `Arc<dyn _>` and be shared across request handlers.

pub mod clock;
pub mod id_generator;
pub mod scorer;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequentialIdGenerator};
pub use self::scorer::Scorer;
pub use self::task_store::TaskStore;

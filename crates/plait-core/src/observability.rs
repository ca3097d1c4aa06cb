//! Logging setup and graph counters.
//!
//! Level precedence:
//! 1. explicit level (the CLI's `--log-level`)
//! 2. `PLAIT_LOG`, an `EnvFilter` directive such as `debug` or
//!    `plait_core=trace,info`
//! 3. `info`
//!
//! Logs go to stderr so stdout stays free for replies.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PLAIT_LOG";

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init_logging(level: Option<Level>) {
    let filter = match level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from_level(level).into()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Size of the graph across all owners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    /// Owners holding at least one task.
    pub owners: usize,
    pub tasks: usize,
    pub edges: usize,
}

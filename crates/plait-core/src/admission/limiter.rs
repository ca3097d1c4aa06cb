//! Fixed-window admission limiter, one counter per client key.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimiterConfig {
    /// Requests admitted per window.
    pub limit: u32,
    pub window_secs: u64,
    /// Table size above which expired entries are swept.
    pub sweep_threshold: usize,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::general()
    }
}

impl LimiterConfig {
    pub fn general() -> Self {
        Self {
            limit: 100,
            window_secs: 60,
            sweep_threshold: 100,
        }
    }

    pub fn auth() -> Self {
        Self {
            limit: 5,
            ..Self::general()
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn validate(&self, section: &'static str) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::invalid(section, "limit must be positive"));
        }
        if self.window_secs == 0 {
            return Err(ConfigError::invalid(section, "window_secs must be positive"));
        }
        if self.sweep_threshold == 0 {
            return Err(ConfigError::invalid(section, "sweep_threshold must be positive"));
        }
        Ok(())
    }
}

/// Result of [`AdmissionLimiter::check_and_consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: DateTime<Utc>,
}

impl Window {
    fn expired(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now - self.started > window
    }
}

#[derive(Debug)]
struct Table {
    clients: HashMap<String, Window>,
    /// Size that triggers the next sweep.
    next_sweep_at: usize,
}

#[derive(Debug)]
pub struct AdmissionLimiter {
    config: LimiterConfig,
    window: chrono::Duration,
    table: Mutex<Table>,
}

impl AdmissionLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        let window = chrono::Duration::from_std(config.window()).unwrap_or(chrono::Duration::MAX);
        Self {
            table: Mutex::new(Table {
                clients: HashMap::new(),
                next_sweep_at: config.sweep_threshold,
            }),
            window,
            config,
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Admit one request from `client` at `now`, or deny it.
    ///
    /// A denial does not consume: the count stays at the limit until the
    /// window rolls over.
    pub fn check_and_consume(&self, client: &str, now: DateTime<Utc>) -> Admission {
        // Plain counters; a panic elsewhere cannot leave them inconsistent.
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        if table.clients.len() > table.next_sweep_at {
            self.sweep(&mut table, now);
        }

        let window = table
            .clients
            .entry(client.to_string())
            .or_insert(Window {
                count: 0,
                started: now,
            });

        if window.expired(now, self.window) {
            *window = Window {
                count: 0,
                started: now,
            };
        }

        if window.count >= self.config.limit {
            return Admission::Denied {
                retry_after: retry_after(self.window, now - window.started),
            };
        }

        window.count += 1;
        Admission::Allowed {
            remaining: self.config.limit - window.count,
        }
    }

    /// Tracked clients, expired or not.
    pub fn tracked_clients(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }

    fn sweep(&self, table: &mut Table, now: DateTime<Utc>) {
        let before = table.clients.len();
        table
            .clients
            .retain(|_, window| !window.expired(now, self.window));
        let after = table.clients.len();
        table.next_sweep_at = self.config.sweep_threshold.max(after.saturating_mul(2));
        debug!(
            swept = before - after,
            live = after,
            next_sweep_at = table.next_sweep_at,
            "swept expired admission windows"
        );
    }
}

fn retry_after(window: chrono::Duration, elapsed: chrono::Duration) -> Duration {
    window
        .checked_sub(&elapsed)
        .and_then(|left| left.to_std().ok())
        .unwrap_or(Duration::ZERO)
}

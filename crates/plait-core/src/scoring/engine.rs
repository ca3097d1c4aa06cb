//! Deterministic priority scoring.
//!
//! score = base * urgency, clamped to [0, MAX_SCORE], where
//! - base = 5 * min(weight, max_weight) / max_weight, in [0, 5]
//! - urgency = 1.0 without a due date; otherwise linear in the signed time
//!   until due, clamped to +/- horizon: `min_urgency` at a full horizon
//!   ahead, `max_urgency` at a full horizon overdue

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{PriorityScore, ScoringUnavailable};
use crate::ports::Scorer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreConfig {
    /// Weights at or above this get the full base of 5.
    pub max_weight: u32,
    pub min_urgency: f64,
    pub max_urgency: f64,
    pub horizon_hours: u64,
    /// Upper bound on a single scorer call.
    pub timeout_ms: u64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_weight: 10,
            min_urgency: 0.5,
            max_urgency: 2.0,
            horizon_hours: 14 * 24,
            timeout_ms: 250,
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_weight == 0 {
            return Err(ConfigError::invalid("scoring.max_weight", "must be positive"));
        }
        if !self.min_urgency.is_finite() || !self.max_urgency.is_finite() {
            return Err(ConfigError::invalid(
                "scoring.min_urgency",
                "urgency bounds must be finite",
            ));
        }
        if self.min_urgency < 0.0 || self.min_urgency > self.max_urgency {
            return Err(ConfigError::invalid(
                "scoring.min_urgency",
                format!(
                    "need 0 <= min_urgency <= max_urgency, got {} and {}",
                    self.min_urgency, self.max_urgency
                ),
            ));
        }
        if self.horizon_hours == 0 {
            return Err(ConfigError::invalid("scoring.horizon_hours", "must be positive"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("scoring.timeout_ms", "must be positive"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn horizon_secs(&self) -> f64 {
        self.horizon_hours as f64 * 3600.0
    }
}

/// Stateless; clone or share freely.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoreConfig,
}

impl ScoreEngine {
    /// `config` is expected to have passed [`ScoreConfig::validate`].
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn score(
        &self,
        weight: u32,
        due_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> PriorityScore {
        PriorityScore::clamped(self.base(weight) * self.urgency(due_at, now))
    }

    fn base(&self, weight: u32) -> f64 {
        let max = self.config.max_weight.max(1);
        5.0 * f64::from(weight.min(max)) / f64::from(max)
    }

    fn urgency(&self, due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(due_at) = due_at else {
            return 1.0;
        };
        let until = (due_at - now).num_seconds() as f64;
        // -1 = a full horizon overdue, +1 = a full horizon ahead
        let t = (until / self.config.horizon_secs()).clamp(-1.0, 1.0);
        let (lo, hi) = (self.config.min_urgency, self.config.max_urgency);
        hi - (hi - lo) * (t + 1.0) / 2.0
    }
}

#[async_trait]
impl Scorer for ScoreEngine {
    async fn score(
        &self,
        weight: u32,
        due_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PriorityScore, ScoringUnavailable> {
        Ok(ScoreEngine::score(self, weight, due_at, now))
    }
}

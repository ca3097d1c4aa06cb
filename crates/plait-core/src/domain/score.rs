//! Derived priority score and how it travels back to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ScoringUnavailable;

/// Upper bound of every score.
pub const MAX_SCORE: f64 = 10.0;

/// A score in `[0, MAX_SCORE]`. Recomputed on demand, never stored.
///
/// Travels as a bare number; values read back are clamped like fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct PriorityScore(f64);

impl PriorityScore {
    /// Clamp `raw` into range. NaN maps to zero.
    pub fn clamped(raw: f64) -> Self {
        if raw.is_nan() {
            return Self(0.0);
        }
        Self(raw.clamp(0.0, MAX_SCORE))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for PriorityScore {
    fn from(raw: f64) -> Self {
        Self::clamped(raw)
    }
}

impl From<PriorityScore> for f64 {
    fn from(score: PriorityScore) -> Self {
        score.0
    }
}

impl fmt::Display for PriorityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// What happened to the best-effort scoring step of a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored { score: PriorityScore },
    /// The mutation did not touch a scoring input.
    Unchanged,
    Unavailable {
        #[serde(with = "reason")]
        reason: ScoringUnavailable,
    },
}

impl ScoreOutcome {
    pub fn score(&self) -> Option<PriorityScore> {
        match self {
            ScoreOutcome::Scored { score } => Some(*score),
            _ => None,
        }
    }
}

/// A committed mutation result plus its scoring outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored<T> {
    pub value: T,
    pub score: ScoreOutcome,
}

// Serialized as the display string; deserialized back as an opaque failure.
mod reason {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::errors::ScoringUnavailable;

    pub fn serialize<S: Serializer>(value: &ScoringUnavailable, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ScoringUnavailable, D::Error> {
        String::deserialize(d).map(ScoringUnavailable::Failed)
    }
}

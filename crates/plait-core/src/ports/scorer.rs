//! Scorer port - where priority scores come from.
//!
//! The in-process [`ScoreEngine`](crate::scoring::ScoreEngine) never fails,
//! but a deployment may put a remote service here. Callers bound every call
//! with a timeout and treat failure as `ScoringUnavailable`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PriorityScore, ScoringUnavailable};

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        weight: u32,
        due_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PriorityScore, ScoringUnavailable>;
}

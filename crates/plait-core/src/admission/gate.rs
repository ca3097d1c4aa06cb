//! The pair of limiters in front of the core.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::limiter::{Admission, AdmissionLimiter, LimiterConfig};
use crate::domain::{CoreError, Result};

/// Which limiter a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    General,
    /// Credential endpoints (login, registration).
    Auth,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::General => f.write_str("general"),
            Route::Auth => f.write_str("auth"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdmissionConfig {
    pub general: LimiterConfig,
    pub auth: LimiterConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            general: LimiterConfig::general(),
            auth: LimiterConfig::auth(),
        }
    }
}

#[derive(Debug)]
pub struct AdmissionGate {
    general: AdmissionLimiter,
    auth: AdmissionLimiter,
}

impl AdmissionGate {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            general: AdmissionLimiter::new(config.general),
            auth: AdmissionLimiter::new(config.auth),
        }
    }

    pub fn limiter(&self, route: Route) -> &AdmissionLimiter {
        match route {
            Route::General => &self.general,
            Route::Auth => &self.auth,
        }
    }

    /// Admit or reject; a rejection becomes `RateLimitExceeded`.
    pub fn check(&self, route: Route, client: &str, now: DateTime<Utc>) -> Result<u32> {
        match self.limiter(route).check_and_consume(client, now) {
            Admission::Allowed { remaining } => Ok(remaining),
            Admission::Denied { retry_after } => {
                warn!(%route, client, ?retry_after, "request denied by admission limiter");
                Err(CoreError::RateLimitExceeded {
                    client: client.to_string(),
                    retry_after,
                })
            }
        }
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(AdmissionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use chrono::TimeZone;

    #[test]
    fn default_config_has_distinct_limits() {
        let config = AdmissionConfig::default();
        assert_eq!(config.general.limit, 100);
        assert_eq!(config.auth.limit, 5);
    }

    #[test]
    fn routes_do_not_share_counters() {
        let gate = AdmissionGate::default();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        for _ in 0..5 {
            gate.check(Route::Auth, "10.0.0.1", now).unwrap();
        }
        let err = gate.check(Route::Auth, "10.0.0.1", now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        assert_eq!(gate.check(Route::General, "10.0.0.1", now).unwrap(), 99);
    }
}

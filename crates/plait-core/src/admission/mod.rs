//! Request admission: per-client fixed-window limiting.

mod gate;
mod limiter;

pub use gate::{AdmissionConfig, AdmissionGate, Route};
pub use limiter::{Admission, AdmissionLimiter, LimiterConfig};

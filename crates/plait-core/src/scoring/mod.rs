//! Priority scoring.

mod engine;

pub use engine::{ScoreConfig, ScoreEngine};

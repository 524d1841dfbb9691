//! Trade-outcome scoring: evaluates a directional prediction against the
//! revealed future slice and accumulates per-session statistics.

pub mod evaluator;
pub mod stats;

pub use evaluator::{evaluate, EvaluationPolicy};
pub use stats::TradeStats;

//! Spin → analyze → reveal session orchestration.
//!
//! Owns the finite game-state machine, the current window/prediction/outcome
//! triple, and the epoch counter that recognizes stale async completions.

pub mod config;
pub mod oracle;
pub mod session;

pub use config::GameConfig;
pub use oracle::{HeuristicOracle, LocalWindowSource};
pub use session::{AnalysisTicket, GameSession};

// The session API surfaces these core types directly.
pub use game_core::{Candle, GameError, GamePhase, Prediction, PriceLevel, TradeOutcome};

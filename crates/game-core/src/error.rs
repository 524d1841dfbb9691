use thiserror::Error;

use crate::types::GamePhase;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Zero price: {0}")]
    ZeroPrice(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Analysis request failed: {0}")]
    AnalysisRequest(String),

    #[error("Price level request failed: {0}")]
    ProjectionRequest(String),

    #[error("Illegal transition: {event} while {from}")]
    IllegalTransition {
        from: GamePhase,
        event: &'static str,
    },
}

impl GameError {
    /// Recoverable errors leave the session usable; the caller may retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::AnalysisRequest(_) | GameError::ProjectionRequest(_)
        )
    }
}

use async_trait::async_trait;

use crate::{Candle, GameError, Prediction, PriceLevel, Window};

/// Trait for directional analysis oracles (remote AI service or local
/// heuristic). May fail with network/quota/auth errors, surfaced as
/// [`GameError::AnalysisRequest`].
#[async_trait]
pub trait AnalysisOracle: Send + Sync {
    async fn analyze(&self, visible: &[Candle]) -> Result<Prediction, GameError>;
}

/// Trait for price-level oracles, invoked with the visible price range.
#[async_trait]
pub trait LevelOracle: Send + Sync {
    async fn price_levels(
        &self,
        high: f64,
        low: f64,
        current_price: f64,
    ) -> Result<Vec<PriceLevel>, GameError>;
}

/// Trait for window sources. Async to admit remote series backends; the
/// local generator-backed source resolves immediately.
#[async_trait]
pub trait WindowSource: Send + Sync {
    async fn next_window(&self) -> Result<Window, GameError>;
}

//! Built-in range-fraction level oracle.
//!
//! Projects the 0.11 / 0.50 / 0.89 fractions of the visible dealing range,
//! the levels the Goldbach methodology watches for reactions.

use async_trait::async_trait;

use game_core::{GameError, LevelOracle, PriceLevel};

const FRACTIONS: [(f64, &str, &str); 3] = [
    (0.11, "0.11 (Support)", "#ef4444"),
    (0.50, "0.50 (Equilibrium)", "#eab308"),
    (0.89, "0.89 (Resistance)", "#22c55e"),
];

/// Local [`LevelOracle`] computing range-fraction levels from the visible
/// high/low. A degenerate range yields an empty set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeFractionOracle;

impl RangeFractionOracle {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core, usable without the async trait plumbing.
    pub fn compute(&self, high: f64, low: f64) -> Vec<PriceLevel> {
        let range = high - low;
        if range <= 0.0 {
            return Vec::new();
        }
        FRACTIONS
            .iter()
            .map(|&(fraction, label, color)| PriceLevel {
                price: low + range * fraction,
                color: color.to_string(),
                label: label.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl LevelOracle for RangeFractionOracle {
    async fn price_levels(
        &self,
        high: f64,
        low: f64,
        _current_price: f64,
    ) -> Result<Vec<PriceLevel>, GameError> {
        Ok(self.compute(high, low))
    }
}

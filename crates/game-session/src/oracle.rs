//! Built-in collaborators: a generator-backed window source and a heuristic
//! analysis oracle for offline play.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use game_core::{
    AnalysisOracle, Candle, Direction, GameError, Prediction, Series, Window, WindowSource,
};
use market_sim::{select_window, GeneratorConfig, SeriesGenerator};

use crate::config::GameConfig;

/// Window source backed by a locally generated series. Resolves
/// immediately; the async trait only exists for remote deployments.
pub struct LocalWindowSource {
    series: Series,
    window_size: usize,
    future_size: usize,
    rng: Mutex<StdRng>,
}

impl LocalWindowSource {
    pub fn new(series: Series, window_size: usize, future_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            series,
            window_size,
            future_size,
            rng: Mutex::new(rng),
        }
    }

    /// Generate a fresh series per the generator config and wrap it.
    pub fn generate(
        game: &GameConfig,
        generator: GeneratorConfig,
    ) -> Result<Self, GameError> {
        let seed = generator.seed;
        let series = SeriesGenerator::new(generator).generate(game.series_len)?;
        Ok(Self::new(series, game.window_size, game.future_size, seed))
    }
}

#[async_trait]
impl WindowSource for LocalWindowSource {
    async fn next_window(&self) -> Result<Window, GameError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GameError::InvalidData("window source rng poisoned".to_string()))?;
        select_window(&self.series, self.window_size, self.future_size, &mut *rng)
    }
}

const BULLISH_PATTERNS: [&str; 5] = [
    "Bullish Order Block",
    "Fair Value Gap Fill",
    "Liquidity Sweep",
    "RSI Divergence",
    "Golden Cross",
];

const BEARISH_PATTERNS: [&str; 5] = [
    "Bearish Breaker",
    "Distribution Block",
    "Premium Array",
    "MACD Bearish Cross",
    "Supply Zone Rejection",
];

/// Offline analysis oracle producing random but semi-realistic calls:
/// entry at the last close, a 0.5%-of-price mock ATR, 1:2 risk/reward
/// targets and a confidence in the 0.75-0.95 band.
pub struct HeuristicOracle {
    rng: Mutex<StdRng>,
}

impl HeuristicOracle {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl AnalysisOracle for HeuristicOracle {
    async fn analyze(&self, visible: &[Candle]) -> Result<Prediction, GameError> {
        let last = visible.last().ok_or_else(|| {
            GameError::InsufficientData("cannot analyze an empty visible slice".to_string())
        })?;
        let entry = last.close;
        if entry == 0.0 {
            return Err(GameError::ZeroPrice("last close is zero".to_string()));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GameError::AnalysisRequest("oracle rng poisoned".to_string()))?;

        let bullish = rng.gen_bool(0.5);
        let atr = entry * 0.005;
        let (direction, target, stop, patterns) = if bullish {
            (
                Direction::Bullish,
                entry + atr * 2.0,
                entry - atr,
                &BULLISH_PATTERNS,
            )
        } else {
            (
                Direction::Bearish,
                entry - atr * 2.0,
                entry + atr,
                &BEARISH_PATTERNS,
            )
        };
        let confidence = 0.75 + rng.gen::<f64>() * 0.2;
        let pattern = patterns.choose(&mut *rng).copied().map(str::to_string);

        debug!(%direction, entry, target, stop, "heuristic analysis");
        Ok(Prediction {
            direction,
            entry,
            target,
            stop,
            confidence,
            pattern,
            reasoning: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn visible() -> Vec<Candle> {
        vec![Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            open: 99.0,
            high: 101.0,
            low: 98.0,
            close: 100.0,
            volume: None,
        }]
    }

    #[tokio::test]
    async fn heuristic_calls_have_one_to_two_risk_reward() {
        let oracle = HeuristicOracle::new(Some(8));
        for _ in 0..20 {
            let p = oracle.analyze(&visible()).await.unwrap();
            assert_eq!(p.entry, 100.0);
            let reward = (p.target - p.entry).abs();
            let risk = (p.stop - p.entry).abs();
            assert!((reward - 2.0 * risk).abs() < 1e-9);
            assert!((0.75..=0.95).contains(&p.confidence));
            assert!(p.pattern.is_some());
            match p.direction {
                Direction::Bullish => assert!(p.target > p.entry && p.stop < p.entry),
                Direction::Bearish => assert!(p.target < p.entry && p.stop > p.entry),
                Direction::Neutral => panic!("heuristic oracle never abstains"),
            }
        }
    }

    #[tokio::test]
    async fn empty_visible_slice_is_rejected() {
        let oracle = HeuristicOracle::new(Some(8));
        assert!(matches!(
            oracle.analyze(&[]).await,
            Err(GameError::InsufficientData(_))
        ));
    }

    #[tokio::test]
    async fn local_source_yields_windows_of_configured_size() {
        let game = GameConfig {
            series_len: 300,
            ..GameConfig::default()
        };
        let generator = GeneratorConfig {
            seed: Some(21),
            ..GeneratorConfig::default()
        };
        let source = LocalWindowSource::generate(&game, generator).unwrap();
        let window = source.next_window().await.unwrap();
        assert_eq!(window.visible_past.len(), 100);
        assert_eq!(window.hidden_future.len(), 50);
    }
}

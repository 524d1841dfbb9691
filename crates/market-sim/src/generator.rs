//! Bounded random-walk OHLC series generator.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use game_core::{Candle, GameError, Series};

/// How far the clock advances between consecutive candles.
///
/// Both the daily and the intraday convention appear in deployments, so the
/// step is a configuration option rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStep {
    /// One calendar day per candle.
    Days(u32),
    /// Fixed number of seconds per candle (intraday granularity).
    Seconds(u32),
}

impl TimeStep {
    fn duration(&self) -> Duration {
        match self {
            TimeStep::Days(d) => Duration::days(i64::from(*d)),
            TimeStep::Seconds(s) => Duration::seconds(i64::from(*s)),
        }
    }
}

/// Tunables for the random walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub start_price: f64,
    pub start_time: DateTime<Utc>,
    pub time_step: TimeStep,
    /// Per-step volatility drawn uniformly from this range, as a fraction
    /// of the current price.
    pub volatility_min: f64,
    pub volatility_max: f64,
    /// Upper bound on wick magnitude, as a fraction of the current price.
    pub max_wick_fraction: f64,
    /// Monetary rounding for display stability.
    pub decimals: u32,
    /// Optional clamp keeping the walk above a small positive floor. Off by
    /// default: at realistic volatilities a bounded session never reaches
    /// zero.
    pub price_floor: Option<f64>,
    /// Fixed seed for reproducible series; `None` uses thread entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_price: 4150.0,
            start_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            time_step: TimeStep::Days(1),
            volatility_min: 0.002,
            volatility_max: 0.010,
            max_wick_fraction: 0.005,
            decimals: 2,
            price_floor: None,
            seed: None,
        }
    }
}

/// Produces a long synthetic OHLC sequence via a bounded random walk.
pub struct SeriesGenerator {
    config: GeneratorConfig,
}

impl SeriesGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate `count` candles. A degenerate `count == 0` yields an empty
    /// series.
    pub fn generate(&self, count: usize) -> Result<Series, GameError> {
        let mut rng: StdRng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(rand::thread_rng()).map_err(|e| {
                GameError::InvalidData(format!("rng initialization failed: {e}"))
            })?,
        };

        let mut candles = Vec::with_capacity(count);
        let mut price = self.config.start_price;
        let mut time = self.config.start_time;

        for _ in 0..count {
            let volatility = rng.gen_range(self.config.volatility_min..=self.config.volatility_max);
            let delta = (rng.gen::<f64>() - 0.5) * price * volatility;

            let open = price;
            let mut close = open + delta;
            if let Some(floor) = self.config.price_floor {
                close = close.max(floor);
            }

            let wick_high = rng.gen::<f64>() * price * self.config.max_wick_fraction;
            let wick_low = rng.gen::<f64>() * price * self.config.max_wick_fraction;

            let high = open.max(close) + wick_high;
            let low = open.min(close) - wick_low;

            candles.push(Candle {
                timestamp: time,
                open: round_to(open, self.config.decimals),
                high: round_to(high, self.config.decimals),
                low: round_to(low, self.config.decimals),
                close: round_to(close, self.config.decimals),
                volume: None,
            });

            price = close;
            time += self.config.time_step.duration();
        }

        debug!(count, final_price = price, "generated synthetic series");
        Series::from_candles(candles)
    }
}

/// Round to a fixed number of decimal places. Monotonic, so rounding the
/// four OHLC values independently preserves their ordering invariants.
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn empty_count_yields_empty_series() {
        let series = SeriesGenerator::new(seeded_config(1)).generate(0).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn every_candle_satisfies_ohlc_invariants() {
        let series = SeriesGenerator::new(seeded_config(42)).generate(2000).unwrap();
        assert_eq!(series.len(), 2000);
        for candle in series.candles() {
            assert!(
                candle.low <= candle.open.min(candle.close),
                "low above body at {}",
                candle.timestamp
            );
            assert!(
                candle.high >= candle.open.max(candle.close),
                "high below body at {}",
                candle.timestamp
            );
        }
    }

    #[test]
    fn timestamps_strictly_increase_by_the_configured_step() {
        let config = GeneratorConfig {
            time_step: TimeStep::Seconds(300),
            ..seeded_config(7)
        };
        let series = SeriesGenerator::new(config).generate(50).unwrap();
        for pair in series.candles().windows(2) {
            assert_eq!(
                pair[1].timestamp - pair[0].timestamp,
                Duration::seconds(300)
            );
        }
    }

    #[test]
    fn prices_are_rounded_to_two_decimals() {
        let series = SeriesGenerator::new(seeded_config(3)).generate(100).unwrap();
        for candle in series.candles() {
            for value in [candle.open, candle.high, candle.low, candle.close] {
                let scaled = value * 100.0;
                assert!((scaled - scaled.round()).abs() < 1e-6, "unrounded {value}");
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = SeriesGenerator::new(seeded_config(99)).generate(200).unwrap();
        let b = SeriesGenerator::new(seeded_config(99)).generate(200).unwrap();
        assert_eq!(a.candles(), b.candles());
    }

    #[test]
    fn price_floor_clamps_the_walk() {
        let config = GeneratorConfig {
            start_price: 0.05,
            volatility_min: 0.5,
            volatility_max: 0.9,
            price_floor: Some(0.01),
            ..seeded_config(11)
        };
        let series = SeriesGenerator::new(config).generate(500).unwrap();
        for candle in series.candles() {
            assert!(candle.close >= 0.01);
        }
    }
}

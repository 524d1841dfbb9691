use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// One OHLC(V) price bar for a fixed time bucket.
///
/// Immutable once generated. Invariants: `low <= min(open, close)` and
/// `high >= max(open, close)`, hence `high >= low`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    /// Whether the bar satisfies the OHLC ordering invariants.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

/// An ordered sequence of candles with strictly increasing timestamps.
///
/// Created once by the generator (or a remote series source) and read-only
/// afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series, validating timestamp ordering and candle shape.
    pub fn from_candles(candles: Vec<Candle>) -> Result<Self, GameError> {
        for pair in candles.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(GameError::InvalidData(format!(
                    "non-increasing timestamp at {}",
                    pair[1].timestamp
                )));
            }
        }
        if let Some(bad) = candles.iter().find(|c| !c.is_well_formed()) {
            return Err(GameError::InvalidData(format!(
                "malformed candle at {}: open={} high={} low={} close={}",
                bad.timestamp, bad.open, bad.high, bad.low, bad.close
            )));
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// The visible-past / hidden-future pair sampled for one round of the game.
///
/// Both halves are contiguous and adjacent within the parent series:
/// `hidden_future[0]` immediately follows `visible_past[last]`. A window is
/// created on every spin and replaced wholesale on the next one; the hidden
/// future joins the visible set only on reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    pub visible_past: Vec<Candle>,
    pub hidden_future: Vec<Candle>,
}

/// Predicted market direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Bullish => write!(f, "BULLISH"),
            Direction::Bearish => write!(f, "BEARISH"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BULLISH" => Ok(Direction::Bullish),
            "BEARISH" => Ok(Direction::Bearish),
            "NEUTRAL" => Ok(Direction::Neutral),
            other => Err(GameError::InvalidData(format!(
                "unknown direction: {other}"
            ))),
        }
    }
}

/// A directional call produced by an analysis oracle.
///
/// Treated as opaque input by the evaluator. `confidence` is canonically
/// normalized to `[0, 1]`; oracles speaking integer percentages convert at
/// the boundary via [`Prediction::confidence_from_percent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub direction: Direction,
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
    /// Normalized confidence in [0, 1].
    pub confidence: f64,
    /// Pattern or setup label supplied by the oracle.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Free-form reasoning/narrative from the oracle.
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl Prediction {
    /// Convert an integer-percentage confidence (0-100 wire format) to the
    /// canonical normalized representation.
    pub fn confidence_from_percent(percent: f64) -> f64 {
        (percent / 100.0).clamp(0.0, 1.0)
    }
}

/// Result of scoring one prediction against the revealed future.
///
/// Derived once per reveal, never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub won: bool,
    /// Signed percentage profit-and-loss relative to the entry/start price.
    pub pnl_percent: f64,
    pub final_price: f64,
}

/// The phase of the spin/analyze/reveal round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No window loaded yet.
    Idle,
    /// A window is loaded, awaiting analysis.
    Ready,
    /// An analysis request is in flight.
    Analyzing,
    /// A prediction exists, awaiting reveal.
    Analyzed,
    /// The future was revealed and scored.
    Revealed,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GamePhase::Idle => write!(f, "idle"),
            GamePhase::Ready => write!(f, "ready"),
            GamePhase::Analyzing => write!(f, "analyzing"),
            GamePhase::Analyzed => write!(f, "analyzed"),
            GamePhase::Revealed => write!(f, "revealed"),
        }
    }
}

/// An annotated horizontal price marker shown on the chart.
///
/// Level sets are replaced wholesale on each projection, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub color: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(ts: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    #[test]
    fn well_formed_candle_accepts_wicks() {
        assert!(candle(0, 100.0, 101.5, 99.0, 100.5).is_well_formed());
        assert!(candle(0, 100.0, 100.0, 100.0, 100.0).is_well_formed());
    }

    #[test]
    fn malformed_candle_detected() {
        // High below the close
        assert!(!candle(0, 100.0, 100.2, 99.0, 100.5).is_well_formed());
        // Low above the open
        assert!(!candle(0, 100.0, 101.0, 100.2, 100.5).is_well_formed());
    }

    #[test]
    fn series_rejects_unordered_timestamps() {
        let result = Series::from_candles(vec![
            candle(100, 100.0, 101.0, 99.0, 100.5),
            candle(100, 100.5, 101.0, 99.0, 100.0),
        ]);
        assert!(matches!(result, Err(GameError::InvalidData(_))));
    }

    #[test]
    fn series_accepts_ordered_candles() {
        let series = Series::from_candles(vec![
            candle(100, 100.0, 101.0, 99.0, 100.5),
            candle(200, 100.5, 102.0, 100.0, 101.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn direction_round_trips_through_strings() {
        assert_eq!("bullish".parse::<Direction>().unwrap(), Direction::Bullish);
        assert_eq!(Direction::Bearish.to_string(), "BEARISH");
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn percent_confidence_normalizes() {
        assert_eq!(Prediction::confidence_from_percent(75.0), 0.75);
        assert_eq!(Prediction::confidence_from_percent(150.0), 1.0);
        assert_eq!(Prediction::confidence_from_percent(-5.0), 0.0);
    }
}

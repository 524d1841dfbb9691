//! Win/loss and PnL scoring applied once the hidden future is revealed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use game_core::{Candle, Direction, GameError, Prediction, TradeOutcome};

/// How a prediction is scored against the revealed candles.
///
/// Both policies are legitimate readings of the game; `CloseToClose` is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPolicy {
    /// Compare the first open against the last close of the future slice.
    #[default]
    CloseToClose,
    /// Scan candle by candle for the first target/stop touch; fall back to
    /// the final close when neither is reached.
    FirstTouch,
}

impl std::str::FromStr for EvaluationPolicy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "close_to_close" | "close" => Ok(EvaluationPolicy::CloseToClose),
            "first_touch" | "touch" => Ok(EvaluationPolicy::FirstTouch),
            other => Err(GameError::InvalidData(format!(
                "unknown evaluation policy: {other}"
            ))),
        }
    }
}

/// Score a prediction against the revealed future slice.
///
/// An empty future slice is a contract violation and fails loudly; a zero
/// reference price is fatal for this evaluation only.
pub fn evaluate(
    prediction: &Prediction,
    hidden_future: &[Candle],
    policy: EvaluationPolicy,
) -> Result<TradeOutcome, GameError> {
    let last = hidden_future.last().ok_or_else(|| {
        GameError::InsufficientData("cannot evaluate an empty future slice".to_string())
    })?;

    // A neutral call never wins or loses anything.
    if prediction.direction == Direction::Neutral {
        return Ok(TradeOutcome {
            won: false,
            pnl_percent: 0.0,
            final_price: last.close,
        });
    }

    let outcome = match policy {
        EvaluationPolicy::CloseToClose => close_to_close(prediction, hidden_future, last)?,
        EvaluationPolicy::FirstTouch => first_touch(prediction, hidden_future, last)?,
    };
    debug!(
        direction = %prediction.direction,
        won = outcome.won,
        pnl = outcome.pnl_percent,
        "evaluated outcome"
    );
    Ok(outcome)
}

fn close_to_close(
    prediction: &Prediction,
    hidden_future: &[Candle],
    last: &Candle,
) -> Result<TradeOutcome, GameError> {
    let start_price = hidden_future[0].open;
    if start_price == 0.0 {
        return Err(GameError::ZeroPrice(
            "future slice opens at zero".to_string(),
        ));
    }
    let end_price = last.close;

    let market_went_up = end_price > start_price;
    let bullish = prediction.direction == Direction::Bullish;
    let won = (bullish && market_went_up) || (!bullish && !market_went_up);

    let raw_pnl = (end_price - start_price) / start_price * 100.0;
    Ok(TradeOutcome {
        won,
        pnl_percent: if bullish { raw_pnl } else { -raw_pnl },
        final_price: end_price,
    })
}

fn first_touch(
    prediction: &Prediction,
    hidden_future: &[Candle],
    last: &Candle,
) -> Result<TradeOutcome, GameError> {
    let entry = prediction.entry;
    if entry == 0.0 {
        return Err(GameError::ZeroPrice("prediction entry is zero".to_string()));
    }
    let bullish = prediction.direction == Direction::Bullish;

    for candle in hidden_future {
        // Stop is checked before target within a candle: when both are
        // touched intrabar the conservative reading loses.
        if bullish {
            if candle.low <= prediction.stop {
                return Ok(touch_outcome(false, entry, prediction.stop, bullish));
            }
            if candle.high >= prediction.target {
                return Ok(touch_outcome(true, entry, prediction.target, bullish));
            }
        } else {
            if candle.high >= prediction.stop {
                return Ok(touch_outcome(false, entry, prediction.stop, bullish));
            }
            if candle.low <= prediction.target {
                return Ok(touch_outcome(true, entry, prediction.target, bullish));
            }
        }
    }

    // Neither level touched within the window: score against the final
    // close, signed by direction.
    let final_close = last.close;
    let pnl = if bullish {
        (final_close - entry) / entry * 100.0
    } else {
        (entry - final_close) / entry * 100.0
    };
    Ok(TradeOutcome {
        won: pnl > 0.0,
        pnl_percent: pnl,
        final_price: final_close,
    })
}

fn touch_outcome(won: bool, entry: f64, touched: f64, bullish: bool) -> TradeOutcome {
    let raw = (touched - entry) / entry * 100.0;
    TradeOutcome {
        won,
        pnl_percent: if bullish { raw } else { -raw },
        final_price: touched,
    }
}

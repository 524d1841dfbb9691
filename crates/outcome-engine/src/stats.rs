//! Session-scoped win/loss/PnL accumulator.

use serde::{Deserialize, Serialize};

use game_core::TradeOutcome;

/// Cumulative trade statistics for one session.
///
/// Monotonically accumulated as outcomes are produced; reset only through
/// an explicit [`TradeStats::reset`], never automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub wins: u32,
    pub losses: u32,
    pub cumulative_pnl: f64,
}

impl TradeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the running totals.
    pub fn record(&mut self, outcome: &TradeOutcome) {
        if outcome.won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.cumulative_pnl += outcome.pnl_percent;
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win rate as a 0-100 percentage; `None` before any trade.
    pub fn win_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| f64::from(self.wins) / f64::from(total) * 100.0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(won: bool, pnl: f64) -> TradeOutcome {
        TradeOutcome {
            won,
            pnl_percent: pnl,
            final_price: 100.0,
        }
    }

    #[test]
    fn records_accumulate_monotonically() {
        let mut stats = TradeStats::new();
        stats.record(&outcome(true, 4.0));
        stats.record(&outcome(false, -2.5));
        stats.record(&outcome(true, 1.5));

        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert!((stats.cumulative_pnl - 3.0).abs() < 1e-9);
        assert!((stats.win_rate().unwrap() - 66.666).abs() < 0.01);
    }

    #[test]
    fn win_rate_is_undefined_before_any_trade() {
        assert!(TradeStats::new().win_rate().is_none());
    }

    #[test]
    fn reset_is_explicit_and_total() {
        let mut stats = TradeStats::new();
        stats.record(&outcome(true, 10.0));
        stats.reset();
        assert_eq!(stats, TradeStats::default());
    }
}

//! Random contiguous window selection with lookback/lookahead buffers.

use rand::Rng;
use tracing::debug;

use game_core::{GameError, Series, Window};

/// Pick a uniformly random split point and return the visible-past /
/// hidden-future pair around it.
///
/// Valid split indices are `window_size ..= len - future_size`, inclusive on
/// both ends, so a series with zero slack (`len == window_size +
/// future_size`) still yields its unique valid window. Draws are
/// independent; repeats across calls are expected over many spins.
pub fn select_window(
    series: &Series,
    window_size: usize,
    future_size: usize,
    rng: &mut impl Rng,
) -> Result<Window, GameError> {
    let len = series.len();
    let min = window_size;
    let max = match len.checked_sub(future_size) {
        Some(max) if max >= min => max,
        _ => {
            return Err(GameError::InsufficientData(format!(
                "series of {len} candles cannot fit window {window_size} + future {future_size}"
            )))
        }
    };

    let split = rng.gen_range(min..=max);
    debug!(split, window_size, future_size, "selected window");

    let candles = series.candles();
    Ok(Window {
        visible_past: candles[split - window_size..split].to_vec(),
        hidden_future: candles[split..split + future_size].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorConfig, SeriesGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn series(len: usize) -> Series {
        SeriesGenerator::new(GeneratorConfig {
            seed: Some(5),
            ..GeneratorConfig::default()
        })
        .generate(len)
        .unwrap()
    }

    #[test]
    fn window_has_requested_sizes_and_is_contiguous() {
        let series = series(500);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let window = select_window(&series, 100, 50, &mut rng).unwrap();
            assert_eq!(window.visible_past.len(), 100);
            assert_eq!(window.hidden_future.len(), 50);
            // No gap, no overlap: the future's first candle immediately
            // follows the past's last candle in the parent series.
            let last_past = window.visible_past.last().unwrap();
            let first_future = window.hidden_future.first().unwrap();
            let idx = series
                .candles()
                .iter()
                .position(|c| c.timestamp == last_past.timestamp)
                .unwrap();
            assert_eq!(series.candles()[idx + 1].timestamp, first_future.timestamp);
        }
    }

    #[test]
    fn zero_slack_returns_the_unique_window() {
        let series = series(150);
        let mut rng = StdRng::seed_from_u64(2);
        let window = select_window(&series, 100, 50, &mut rng).unwrap();
        assert_eq!(window.visible_past.as_slice(), &series.candles()[..100]);
        assert_eq!(window.hidden_future.as_slice(), &series.candles()[100..]);
    }

    #[test]
    fn too_short_series_fails_without_truncating() {
        let series = series(149);
        let mut rng = StdRng::seed_from_u64(3);
        let result = select_window(&series, 100, 50, &mut rng);
        assert!(matches!(result, Err(GameError::InsufficientData(_))));
    }

    #[test]
    fn repeated_draws_cover_multiple_split_points() {
        let series = series(400);
        let mut rng = StdRng::seed_from_u64(4);
        let mut firsts = std::collections::HashSet::new();
        for _ in 0..100 {
            let window = select_window(&series, 100, 50, &mut rng).unwrap();
            firsts.insert(window.visible_past[0].timestamp);
        }
        assert!(firsts.len() > 1, "draws should vary across calls");
    }
}

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use outcome_engine::EvaluationPolicy;

/// Session configuration with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of the generated synthetic series.
    pub series_len: usize,
    /// Visible lookback candles per round.
    pub window_size: usize,
    /// Hidden lookahead candles per round.
    pub future_size: usize,
    /// How outcomes are scored on reveal.
    pub policy: EvaluationPolicy,
    /// Quiescence interval for level projection.
    pub level_debounce: Duration,
    /// Whether the level-projecting mode is active for this session.
    pub level_mode: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            series_len: 5000,
            window_size: 100,
            future_size: 50,
            policy: EvaluationPolicy::CloseToClose,
            level_debounce: Duration::from_millis(300),
            level_mode: false,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `REPLAY_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            series_len: env_parse("REPLAY_SERIES_LEN", defaults.series_len),
            window_size: env_parse("REPLAY_WINDOW_SIZE", defaults.window_size),
            future_size: env_parse("REPLAY_FUTURE_SIZE", defaults.future_size),
            policy: env::var("REPLAY_EVAL_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.policy),
            level_debounce: Duration::from_millis(env_parse(
                "REPLAY_LEVEL_DEBOUNCE_MS",
                defaults.level_debounce.as_millis() as u64,
            )),
            level_mode: env_parse("REPLAY_LEVEL_MODE", defaults.level_mode),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_game_conventions() {
        let config = GameConfig::default();
        assert_eq!(config.window_size, 100);
        assert_eq!(config.future_size, 50);
        assert_eq!(config.series_len, 5000);
        assert_eq!(config.policy, EvaluationPolicy::CloseToClose);
        assert_eq!(config.level_debounce, Duration::from_millis(300));
    }
}

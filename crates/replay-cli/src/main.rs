//! Terminal driver for the replay game: generates a synthetic market, then
//! runs spin → analyze → reveal rounds with the built-in heuristic oracle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{info, warn};

use game_session::{GameConfig, GameSession, HeuristicOracle, LocalWindowSource};
use level_projector::{LevelProjector, ProjectorConfig, RangeFractionOracle};
use market_sim::GeneratorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GameConfig::from_env();
    let rounds: usize = std::env::var("REPLAY_ROUNDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    info!(
        series_len = config.series_len,
        window = config.window_size,
        future = config.future_size,
        policy = ?config.policy,
        rounds,
        "starting replay session"
    );

    let source = LocalWindowSource::generate(&config, GeneratorConfig::default())
        .context("failed to generate the synthetic series")?;
    let oracle = HeuristicOracle::new(None);

    let mut session = GameSession::new(config.clone());
    if config.level_mode {
        session.attach_projector(LevelProjector::spawn(
            Arc::new(RangeFractionOracle::new()),
            ProjectorConfig {
                debounce: config.level_debounce,
            },
        ));
    }

    for round in 1..=rounds {
        session.spin(&source).await.context("spin failed")?;

        if let Err(e) = session.analyze(&oracle).await {
            warn!(round, error = %e, "analysis failed, skipping round");
            continue;
        }
        let prediction = session
            .prediction()
            .context("analyzed session carries a prediction")?;
        info!(
            round,
            direction = %prediction.direction,
            entry = prediction.entry,
            target = prediction.target,
            stop = prediction.stop,
            pattern = prediction.pattern.as_deref().unwrap_or("-"),
            "prediction"
        );

        if config.level_mode {
            if let Some((high, low, current)) = visible_range(session.visible()) {
                session.notify_range_change(high, low, current);
                // Let the debounce quiescence elapse so the projection
                // round-trip completes before the reveal.
                sleep(config.level_debounce + Duration::from_millis(50)).await;
                for level in session.levels() {
                    info!(round, price = level.price, label = %level.label, "price level");
                }
            }
        }

        let outcome = session.reveal().context("reveal failed")?;
        info!(
            round,
            won = outcome.won,
            pnl = format!("{:+.2}%", outcome.pnl_percent),
            final_price = outcome.final_price,
            "outcome"
        );
    }

    let stats = session.stats();
    info!(
        wins = stats.wins,
        losses = stats.losses,
        win_rate = stats
            .win_rate()
            .map(|r| format!("{r:.1}%"))
            .unwrap_or_else(|| "-".to_string()),
        cumulative_pnl = format!("{:+.2}%", stats.cumulative_pnl),
        "session complete"
    );

    Ok(())
}

/// Visible high/low/last-close of the candles on the chart.
fn visible_range(candles: &[game_session::Candle]) -> Option<(f64, f64, f64)> {
    let last = candles.last()?;
    let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Some((high, low, last.close))
}

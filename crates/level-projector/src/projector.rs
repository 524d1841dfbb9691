//! Debounced price-level recomputation driven by visible-range changes.
//!
//! Rapid range notifications (continuous zoom/pan) collapse to a single
//! oracle round-trip after a quiescence interval; only the last pending
//! range is issued. Responses are epoch-stamped so a stale response never
//! overwrites the result of a newer request. Oracle failures leave the
//! current level set unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, warn};

use game_core::{LevelOracle, PriceLevel};

#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    /// Quiescence interval before a pending range change is issued.
    pub debounce: Duration,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RangeChange {
    high: f64,
    low: f64,
    current_price: f64,
}

enum Command {
    Range(RangeChange),
    Enabled(bool),
    Clear,
}

/// Handle to the projection worker task. Dropping the handle shuts the
/// worker down.
pub struct LevelProjector {
    tx: mpsc::UnboundedSender<Command>,
    levels_rx: watch::Receiver<Vec<PriceLevel>>,
}

impl LevelProjector {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(oracle: Arc<dyn LevelOracle>, config: ProjectorConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (levels_tx, levels_rx) = watch::channel(Vec::new());
        tokio::spawn(worker(oracle, config, rx, levels_tx));
        Self { tx, levels_rx }
    }

    /// Non-blocking notification that the visible price range changed.
    /// Ignored while the projector is disabled.
    pub fn notify_range_change(&self, high: f64, low: f64, current_price: f64) {
        let _ = self.tx.send(Command::Range(RangeChange {
            high,
            low,
            current_price,
        }));
    }

    /// Gate projection on/off. The session enables it only while levels are
    /// meaningful (analyzed/revealed with a level mode active).
    pub fn set_enabled(&self, enabled: bool) {
        let _ = self.tx.send(Command::Enabled(enabled));
    }

    /// Drop any pending request and replace the level set with an empty one.
    pub fn clear(&self) {
        let _ = self.tx.send(Command::Clear);
    }

    /// The most recently published level set.
    pub fn levels(&self) -> Vec<PriceLevel> {
        self.levels_rx.borrow().clone()
    }

    /// Watch channel for wholesale level-set replacements.
    pub fn subscribe(&self) -> watch::Receiver<Vec<PriceLevel>> {
        self.levels_rx.clone()
    }
}

async fn worker(
    oracle: Arc<dyn LevelOracle>,
    config: ProjectorConfig,
    mut rx: mpsc::UnboundedReceiver<Command>,
    levels_tx: watch::Sender<Vec<PriceLevel>>,
) {
    let mut enabled = false;
    let mut pending: Option<RangeChange> = None;
    // Epoch of the newest issued request; responses from older epochs are
    // discarded at completion time.
    let newest = Arc::new(AtomicU64::new(0));
    let mut next_epoch: u64 = 0;

    loop {
        let cmd = if pending.is_some() {
            match timeout(config.debounce, rx.recv()).await {
                Ok(Some(cmd)) => Some(cmd),
                Ok(None) => return,
                // Quiescence reached: fire the pending request.
                Err(_) => None,
            }
        } else {
            match rx.recv().await {
                Some(cmd) => Some(cmd),
                None => return,
            }
        };

        match cmd {
            Some(Command::Range(range)) => {
                if enabled {
                    // Coalesce: only the latest pending range survives.
                    pending = Some(range);
                }
            }
            Some(Command::Enabled(value)) => {
                enabled = value;
                if !enabled {
                    pending = None;
                    // Invalidate in-flight requests: their responses must
                    // not land after the projector was switched off.
                    next_epoch += 1;
                    newest.store(next_epoch, Ordering::SeqCst);
                }
            }
            Some(Command::Clear) => {
                pending = None;
                next_epoch += 1;
                newest.store(next_epoch, Ordering::SeqCst);
                let _ = levels_tx.send(Vec::new());
            }
            None => {
                let Some(range) = pending.take() else { continue };
                next_epoch += 1;
                let epoch = next_epoch;
                newest.store(epoch, Ordering::SeqCst);
                debug!(epoch, high = range.high, low = range.low, "issuing level projection");

                // In-flight requests are not cancelled; overlap is allowed
                // and staleness is resolved when each response lands.
                let oracle = Arc::clone(&oracle);
                let newest = Arc::clone(&newest);
                let levels_tx = levels_tx.clone();
                tokio::spawn(async move {
                    match oracle
                        .price_levels(range.high, range.low, range.current_price)
                        .await
                    {
                        Ok(levels) => {
                            if newest.load(Ordering::SeqCst) == epoch {
                                let _ = levels_tx.send(levels);
                            } else {
                                debug!(epoch, "discarding stale level response");
                            }
                        }
                        Err(e) => {
                            warn!(epoch, error = %e, "level projection failed; keeping existing levels");
                        }
                    }
                });
            }
        }
    }
}

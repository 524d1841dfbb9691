//! The finite game-state machine and the session state it guards.

use tracing::{debug, info, warn};
use uuid::Uuid;

use game_core::{
    AnalysisOracle, Candle, GameError, GamePhase, Prediction, PriceLevel, TradeOutcome,
    WindowSource,
};
use level_projector::LevelProjector;
use outcome_engine::{evaluate, TradeStats};

use crate::config::GameConfig;

/// Handle for one in-flight analysis request: the epoch it belongs to and
/// the snapshot of the visible candles it should analyze.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub epoch: u64,
    pub visible: Vec<Candle>,
}

/// One spin/analyze/reveal session.
///
/// Exactly one phase is active at a time and every mutation of the
/// window/prediction/outcome triple flows through a transition method; no
/// caller sets the phase directly. Each spin bumps an epoch counter so that
/// completions of superseded async requests are recognized as stale and
/// discarded.
pub struct GameSession {
    id: Uuid,
    config: GameConfig,
    phase: GamePhase,
    visible: Vec<Candle>,
    hidden: Vec<Candle>,
    prediction: Option<Prediction>,
    outcome: Option<TradeOutcome>,
    stats: TradeStats,
    epoch: u64,
    projector: Option<LevelProjector>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            phase: GamePhase::Idle,
            visible: Vec::new(),
            hidden: Vec::new(),
            prediction: None,
            outcome: None,
            stats: TradeStats::new(),
            epoch: 0,
            projector: None,
        }
    }

    /// Attach a level projector; it is enabled/disabled by transitions.
    pub fn attach_projector(&mut self, projector: LevelProjector) {
        self.projector = Some(projector);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The candles currently on the chart (grows by the revealed future).
    pub fn visible(&self) -> &[Candle] {
        &self.visible
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn outcome(&self) -> Option<&TradeOutcome> {
        self.outcome.as_ref()
    }

    pub fn stats(&self) -> &TradeStats {
        &self.stats
    }

    /// Session statistics survive spins; reset is always explicit.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// The most recently projected level set.
    pub fn levels(&self) -> Vec<PriceLevel> {
        self.projector
            .as_ref()
            .map(|p| p.levels())
            .unwrap_or_default()
    }

    /// Load a fresh window. Legal from every phase; unconditionally discards
    /// the current prediction, outcome and level set before the new window
    /// is requested.
    pub async fn spin(&mut self, source: &dyn WindowSource) -> Result<(), GameError> {
        self.epoch += 1;
        self.prediction = None;
        self.outcome = None;
        if let Some(projector) = &self.projector {
            projector.set_enabled(false);
            projector.clear();
        }

        match source.next_window().await {
            Ok(window) => {
                debug!(
                    session = %self.id,
                    epoch = self.epoch,
                    past = window.visible_past.len(),
                    future = window.hidden_future.len(),
                    "spun new window"
                );
                self.visible = window.visible_past;
                self.hidden = window.hidden_future;
                self.phase = GamePhase::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "window source failed");
                self.visible.clear();
                self.hidden.clear();
                self.phase = GamePhase::Idle;
                Err(e)
            }
        }
    }

    /// Start an analysis round-trip: guard the transition, snapshot the
    /// visible candles and stamp the request with the current epoch.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, GameError> {
        if self.phase != GamePhase::Ready {
            return Err(GameError::IllegalTransition {
                from: self.phase,
                event: "analyze",
            });
        }
        if self.visible.is_empty() {
            return Err(GameError::InsufficientData(
                "no visible candles to analyze".to_string(),
            ));
        }
        self.phase = GamePhase::Analyzing;
        Ok(AnalysisTicket {
            epoch: self.epoch,
            visible: self.visible.clone(),
        })
    }

    /// Apply the completion of an analysis request.
    ///
    /// Returns `Ok(true)` when the result was applied, `Ok(false)` when it
    /// was recognized as stale (superseded by a spin) and dropped. A failed
    /// analysis returns the machine to READY and surfaces a retryable
    /// [`GameError::AnalysisRequest`].
    pub fn complete_analysis(
        &mut self,
        epoch: u64,
        result: Result<Prediction, GameError>,
    ) -> Result<bool, GameError> {
        if epoch != self.epoch || self.phase != GamePhase::Analyzing {
            debug!(
                session = %self.id,
                stale_epoch = epoch,
                current_epoch = self.epoch,
                phase = %self.phase,
                "dropping stale analysis completion"
            );
            return Ok(false);
        }

        match result {
            Ok(prediction) => {
                info!(
                    session = %self.id,
                    direction = %prediction.direction,
                    confidence = prediction.confidence,
                    "analysis complete"
                );
                self.prediction = Some(prediction);
                self.phase = GamePhase::Analyzed;
                if self.config.level_mode {
                    if let Some(projector) = &self.projector {
                        projector.set_enabled(true);
                    }
                }
                Ok(true)
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "analysis failed; back to ready");
                self.phase = GamePhase::Ready;
                match e {
                    GameError::AnalysisRequest(_) => Err(e),
                    other => Err(GameError::AnalysisRequest(other.to_string())),
                }
            }
        }
    }

    /// Convenience wrapper running a full analysis round-trip inline.
    pub async fn analyze(&mut self, oracle: &dyn AnalysisOracle) -> Result<(), GameError> {
        let ticket = self.begin_analysis()?;
        let result = oracle.analyze(&ticket.visible).await;
        self.complete_analysis(ticket.epoch, result).map(|_| ())
    }

    /// Reveal the hidden future: score the prediction, append the future
    /// onto the visible set and record the outcome into the session stats.
    pub fn reveal(&mut self) -> Result<TradeOutcome, GameError> {
        if self.phase != GamePhase::Analyzed {
            return Err(GameError::IllegalTransition {
                from: self.phase,
                event: "reveal",
            });
        }
        let prediction = self.prediction.as_ref().ok_or(GameError::IllegalTransition {
            from: self.phase,
            event: "reveal",
        })?;
        if self.hidden.is_empty() {
            return Err(GameError::IllegalTransition {
                from: self.phase,
                event: "reveal",
            });
        }

        // Evaluate before mutating: a ZeroPrice failure leaves the session
        // in ANALYZED with the window intact.
        let outcome = evaluate(prediction, &self.hidden, self.config.policy)?;

        let mut revealed = std::mem::take(&mut self.hidden);
        self.visible.append(&mut revealed);
        self.stats.record(&outcome);
        self.outcome = Some(outcome);
        self.phase = GamePhase::Revealed;
        info!(
            session = %self.id,
            won = outcome.won,
            pnl = outcome.pnl_percent,
            "revealed outcome"
        );
        Ok(outcome)
    }

    /// Forward a visible-range change to the projector. Only meaningful in
    /// ANALYZED/REVEALED with a level mode active; the projector's enable
    /// gate enforces the same rule, this check just avoids queue noise.
    pub fn notify_range_change(&self, high: f64, low: f64, current_price: f64) {
        if !self.config.level_mode {
            return;
        }
        if !matches!(self.phase, GamePhase::Analyzed | GamePhase::Revealed) {
            return;
        }
        if let Some(projector) = &self.projector {
            projector.notify_range_change(high, low, current_price);
        }
    }
}

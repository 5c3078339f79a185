//! Timed multi-round match driven by webcam snapshots
//!
//! A match is a single spawned task that chains its rounds: countdown,
//! snapshot, classification, resolution, pause. Every transition first checks
//! that the match it belongs to is still the current one, so a reset or a
//! webcam stop abandons the task at its next step.

use crate::classifier::GestureClassifier;
use crate::error::GameError;
use crate::events::{Controls, GameEvent};
use crate::session::Context;
use crate::webcam::WebcamController;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchPhase {
    Idle,
    CountingDown { round: u32, remaining: u32 },
    AwaitingSnapshot { round: u32 },
    RoundResolved { round: u32 },
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    pub match_id: Option<Uuid>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub active: bool,
    pub countdown_remaining: u32,
    pub phase: MatchPhase,
    #[serde(skip)]
    epoch: u64,
}

impl MatchState {
    fn new(total_rounds: u32) -> Self {
        Self {
            match_id: None,
            current_round: 0,
            total_rounds,
            active: false,
            countdown_remaining: 0,
            phase: MatchPhase::Idle,
            epoch: 0,
        }
    }

    fn clear(&mut self) {
        self.epoch += 1;
        self.match_id = None;
        self.current_round = 0;
        self.active = false;
        self.countdown_remaining = 0;
        self.phase = MatchPhase::Idle;
    }
}

pub struct MatchController {
    ctx: Arc<Context>,
    webcam: Arc<WebcamController>,
    classifier: Arc<GestureClassifier>,
    state: Arc<Mutex<MatchState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl MatchController {
    pub(crate) fn new(
        ctx: Arc<Context>,
        webcam: Arc<WebcamController>,
        classifier: Arc<GestureClassifier>,
    ) -> Self {
        let total_rounds = ctx.config.total_rounds;
        Self {
            ctx,
            webcam,
            classifier,
            state: Arc::new(Mutex::new(MatchState::new(total_rounds))),
            task: Mutex::new(None),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> MatchState {
        self.state.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub(crate) fn shared_state(&self) -> Arc<Mutex<MatchState>> {
        self.state.clone()
    }

    /// Start a new match; a no-op while one is already running
    pub fn start(&self) -> crate::Result<()> {
        if !self.webcam.is_running() {
            self.ctx.events.status(GameError::WebcamNotRunning.status_text());
            return Err(GameError::WebcamNotRunning);
        }

        let (match_id, epoch, total_rounds) = {
            let mut state = self.state.lock();
            if state.active {
                tracing::debug!("Match start ignored, a match is already active");
                return Ok(());
            }
            state.clear();
            let match_id = Uuid::new_v4();
            state.match_id = Some(match_id);
            state.active = true;
            (match_id, state.epoch, state.total_rounds)
        };

        let score = {
            let mut board = self.ctx.board.lock();
            board.reset_score();
            board.score()
        };

        tracing::info!("Match {} started ({} rounds)", match_id, total_rounds);
        self.ctx.events.emit(GameEvent::MatchStarted {
            match_id,
            total_rounds,
        });
        self.ctx.events.emit(GameEvent::Score(score));
        self.ctx.events.emit(GameEvent::Controls(Controls {
            start_webcam: false,
            stop_webcam: true,
            start_match: false,
        }));

        let run = MatchRun {
            ctx: self.ctx.clone(),
            webcam: self.webcam.clone(),
            classifier: self.classifier.clone(),
            state: self.state.clone(),
            ticker: self.ticker.clone(),
            match_id,
            epoch,
        };

        let handle = tokio::spawn(run.run());
        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    /// Force the machine back to idle and drop any pending timers
    pub fn cancel(&self) {
        let was_active = {
            let mut state = self.state.lock();
            let was_active = state.active || state.phase != MatchPhase::Idle;
            state.clear();
            was_active
        };

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }

        if was_active {
            tracing::info!("Match cancelled");
            self.ctx.events.emit(GameEvent::Phase(MatchPhase::Idle));
            self.ctx.events.emit(GameEvent::Countdown {
                round: 0,
                remaining: 0,
            });
        }
    }
}

enum Snapshot {
    Detected(crate::moves::Move),
    Unrecognized,
    Failed(GameError),
}

struct MatchRun {
    ctx: Arc<Context>,
    webcam: Arc<WebcamController>,
    classifier: Arc<GestureClassifier>,
    state: Arc<Mutex<MatchState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    match_id: Uuid,
    epoch: u64,
}

impl MatchRun {
    async fn run(self) {
        let mut attempts = 0u32;
        let mut round = match self.advance_round() {
            Some(round) => round,
            None => return,
        };

        loop {
            if !self.begin_countdown(round) {
                return;
            }

            // the snapshot waits on its own timer, not on the ticker
            tokio::time::sleep(self.ctx.config.countdown_duration()).await;
            self.stop_ticker();

            match self.take_snapshot(round).await {
                None => return,
                Some(Snapshot::Failed(e)) => {
                    tracing::warn!("Match {} round {} failed: {}", self.match_id, round, e);
                    self.abort(e.status_text());
                    return;
                }
                Some(Snapshot::Unrecognized) => {
                    attempts += 1;
                    if !self.retry_round(round, attempts) {
                        return;
                    }
                    round = match self.advance_round() {
                        Some(round) => round,
                        None => return,
                    };
                }
                Some(Snapshot::Detected(user_move)) => {
                    attempts = 0;
                    match self.resolve_round(round, user_move) {
                        None => return,
                        Some(true) => return,
                        Some(false) => {}
                    }

                    tokio::time::sleep(self.ctx.config.round_pause).await;
                    round = match self.advance_round() {
                        Some(round) => round,
                        None => return,
                    };
                }
            }
        }
    }

    /// Run `f` against the state only if this match is still the current one
    fn with_current<T>(&self, f: impl FnOnce(&mut MatchState) -> T) -> Option<T> {
        let mut state = self.state.lock();
        if state.epoch != self.epoch || !state.active {
            return None;
        }
        Some(f(&mut state))
    }

    fn advance_round(&self) -> Option<u32> {
        self.with_current(|state| {
            state.current_round += 1;
            state.current_round
        })
    }

    fn begin_countdown(&self, round: u32) -> bool {
        let remaining = self.ctx.config.countdown_secs;
        let started = self.with_current(|state| {
            state.countdown_remaining = remaining;
            state.phase = MatchPhase::CountingDown { round, remaining };
        });
        if started.is_none() {
            return false;
        }

        tracing::debug!("Match {} round {} countdown", self.match_id, round);
        self.ctx
            .events
            .emit(GameEvent::Phase(MatchPhase::CountingDown { round, remaining }));
        self.ctx
            .events
            .emit(GameEvent::Countdown { round, remaining });
        self.ctx.events.status(format!(
            "Round {}/{}: get ready...",
            round, self.ctx.config.total_rounds
        ));
        self.spawn_ticker(round);
        true
    }

    fn spawn_ticker(&self, round: u32) {
        let state = self.state.clone();
        let events = self.ctx.events.clone();
        let epoch = self.epoch;
        let period = self.ctx.config.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let remaining = {
                    let mut state = state.lock();
                    if state.epoch != epoch || !state.active {
                        break;
                    }
                    if !matches!(state.phase, MatchPhase::CountingDown { round: r, .. } if r == round)
                    {
                        break;
                    }
                    state.countdown_remaining = state.countdown_remaining.saturating_sub(1);
                    state.phase = MatchPhase::CountingDown {
                        round,
                        remaining: state.countdown_remaining,
                    };
                    state.countdown_remaining
                };

                events.emit(GameEvent::Countdown { round, remaining });
                if remaining == 0 {
                    break;
                }
            }
        });

        if let Some(previous) = self.ticker.lock().replace(handle) {
            previous.abort();
        }
    }

    fn stop_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
    }

    async fn take_snapshot(&self, round: u32) -> Option<Snapshot> {
        self.with_current(|state| {
            state.countdown_remaining = 0;
            state.phase = MatchPhase::AwaitingSnapshot { round };
        })?;
        self.ctx
            .events
            .emit(GameEvent::Phase(MatchPhase::AwaitingSnapshot { round }));

        let frame = match self.webcam.capture_frame() {
            Ok(frame) => frame,
            Err(e) => return Some(Snapshot::Failed(e)),
        };
        let classified = self.classifier.classify(&frame).await;

        // a reset during inference abandons the result
        self.with_current(|_| ())?;

        Some(match classified {
            Ok(Some(user_move)) => Snapshot::Detected(user_move),
            Ok(None) => Snapshot::Unrecognized,
            Err(e) => Snapshot::Failed(e),
        })
    }

    /// Give the round back so it is played again; false if the match is over
    fn retry_round(&self, round: u32, attempts: u32) -> bool {
        let max_retries = self.ctx.config.max_retries_per_round;
        let retried = self.with_current(|state| {
            state.current_round = state.current_round.saturating_sub(1);
        });
        if retried.is_none() {
            return false;
        }

        if let Some(max) = max_retries {
            if attempts > max {
                self.abort(format!(
                    "No gesture detected after {} attempts, match stopped",
                    attempts
                ));
                return false;
            }
        }

        tracing::debug!(
            "Match {} round {}: no gesture detected (attempt {})",
            self.match_id,
            round,
            attempts
        );
        self.ctx
            .events
            .emit(GameEvent::RoundRetry { round, attempt: attempts });
        self.ctx.events.status(format!(
            "No gesture detected! Show rock, paper or scissors. Retrying round {}...",
            round
        ));
        true
    }

    /// Resolve the round; `Some(true)` when it was the last one
    fn resolve_round(&self, round: u32, user_move: crate::moves::Move) -> Option<bool> {
        let ctx = self.ctx.clone();
        let (outcome, finished) = self.with_current(|state| {
            let outcome = ctx.resolve(Some(round), user_move);
            state.phase = MatchPhase::RoundResolved { round };
            let finished = state.current_round >= state.total_rounds;
            if finished {
                state.phase = MatchPhase::Finished;
                state.active = false;
            }
            (outcome, finished)
        })?;

        tracing::debug!(
            "Match {} round {} resolved: {:?}",
            self.match_id,
            round,
            outcome.winner
        );
        self.ctx
            .events
            .emit(GameEvent::Phase(MatchPhase::RoundResolved { round }));

        if finished {
            self.finish();
        }
        Some(finished)
    }

    fn finish(&self) {
        let score = self.ctx.board.lock().score();
        tracing::info!(
            "Match {} finished: {}-{} ({} ties)",
            self.match_id,
            score.user_wins,
            score.computer_wins,
            score.ties
        );

        self.ctx.events.emit(GameEvent::Phase(MatchPhase::Finished));
        self.ctx.events.emit(GameEvent::MatchFinished {
            match_id: self.match_id,
            score,
        });
        self.ctx.events.status(format!(
            "Match over! You {} - {} Computer ({} ties)",
            score.user_wins, score.computer_wins, score.ties
        ));
        self.ctx.events.emit(GameEvent::Controls(Controls {
            start_webcam: false,
            stop_webcam: true,
            start_match: true,
        }));
    }

    fn abort(&self, reason: String) {
        let aborted = self.with_current(|state| {
            state.active = false;
            state.current_round = 0;
            state.countdown_remaining = 0;
            state.phase = MatchPhase::Idle;
        });
        if aborted.is_none() {
            return;
        }
        self.stop_ticker();

        tracing::warn!("Match {} aborted: {}", self.match_id, reason);
        self.ctx.events.emit(GameEvent::Phase(MatchPhase::Idle));
        self.ctx.events.emit(GameEvent::MatchAborted {
            match_id: self.match_id,
            reason: reason.clone(),
        });
        self.ctx.events.status(reason);
        self.ctx.events.emit(GameEvent::Controls(Controls {
            start_webcam: !self.webcam.is_running(),
            stop_webcam: self.webcam.is_running(),
            start_match: self.webcam.is_running(),
        }));
    }
}

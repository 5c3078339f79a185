//! Everything the engine wants shown to the player.
//!
//! The view is a pure sink: it receives `GameEvent`s over an unbounded
//! channel and renders them. No game logic lives on the receiving side.

use crate::classifier::Prediction;
use crate::matches::MatchPhase;
use crate::moves::{Move, RoundOutcome};
use crate::scoreboard::{HistoryEntry, Score};
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Which controls the view should offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_webcam: bool,
    pub stop_webcam: bool,
    pub start_match: bool,
}

#[derive(Debug, Clone, Serialize)]
pub enum GameEvent {
    Status(String),
    Controls(Controls),
    WebcamStarted,
    WebcamStopped,
    Predictions(Vec<Prediction>),
    Detected(Option<Move>),
    MatchStarted {
        match_id: Uuid,
        total_rounds: u32,
    },
    Phase(MatchPhase),
    Countdown {
        round: u32,
        remaining: u32,
    },
    RoundRetry {
        round: u32,
        attempt: u32,
    },
    RoundResolved {
        round: Option<u32>,
        outcome: RoundOutcome,
        message: String,
    },
    Score(Score),
    History(Vec<HistoryEntry>),
    MatchFinished {
        match_id: Uuid,
        score: Score,
    },
    MatchAborted {
        match_id: Uuid,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: UnboundedSender<GameEvent>,
}

impl EventBus {
    pub fn channel() -> (Self, UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: GameEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event dropped, no view attached");
        }
    }

    pub fn status(&self, msg: impl Into<String>) {
        self.emit(GameEvent::Status(msg.into()));
    }
}

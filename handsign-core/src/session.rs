use crate::autoplay::AutoPlayer;
use crate::classifier::{GestureClassifier, ModelLoader};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::events::{Controls, EventBus, GameEvent};
use crate::frame::Frame;
use crate::matches::{MatchController, MatchState};
use crate::messages;
use crate::moves::{Move, RoundOutcome};
use crate::resolver::RoundResolver;
use crate::scoreboard::{HistoryEntry, Score, Scoreboard};
use crate::webcam::{CaptureDevice, WebcamController, WebcamStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// State shared by the session, the match task and auto-play
pub(crate) struct Context {
    pub config: GameConfig,
    pub board: Mutex<Scoreboard>,
    pub resolver: Mutex<RoundResolver>,
    pub events: EventBus,
}

impl Context {
    /// Resolve a round and publish the outcome, score and history
    pub fn resolve(&self, round: Option<u32>, user_move: Move) -> RoundOutcome {
        let (outcome, message, score, history) = {
            let mut resolver = self.resolver.lock();
            let mut board = self.board.lock();
            let outcome = resolver.resolve(user_move, &mut board);
            let message = messages::pick(outcome.winner, resolver.rng()).to_string();
            (outcome, message, board.score(), board.history().entries())
        };

        self.events.emit(GameEvent::RoundResolved {
            round,
            outcome,
            message,
        });
        self.events.emit(GameEvent::Score(score));
        self.events.emit(GameEvent::History(history));
        outcome
    }
}

/// One player's game: score, history, model, webcam and match in one place
pub struct GameSession {
    ctx: Arc<Context>,
    classifier: Arc<GestureClassifier>,
    webcam: Arc<WebcamController>,
    matches: MatchController,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        loader: Arc<dyn ModelLoader>,
        device: Arc<dyn CaptureDevice>,
    ) -> Result<(Self, UnboundedReceiver<GameEvent>)> {
        Self::with_resolver(config, loader, device, RoundResolver::new())
    }

    pub fn with_resolver(
        config: GameConfig,
        loader: Arc<dyn ModelLoader>,
        device: Arc<dyn CaptureDevice>,
        resolver: RoundResolver,
    ) -> Result<(Self, UnboundedReceiver<GameEvent>)> {
        config.validate()?;

        let (events, rx) = EventBus::channel();
        let ctx = Arc::new(Context {
            board: Mutex::new(Scoreboard::new(config.history_capacity)),
            resolver: Mutex::new(resolver),
            events: events.clone(),
            config,
        });

        let classifier = Arc::new(GestureClassifier::new(loader, ctx.config.model.clone()));
        let webcam = Arc::new(WebcamController::new(
            device,
            classifier.clone(),
            ctx.config.camera.clone(),
            events,
        ));
        let matches = MatchController::new(ctx.clone(), webcam.clone(), classifier.clone());

        if ctx.config.auto_play.enabled {
            let auto_player = AutoPlayer::new(ctx.clone(), matches.shared_state());
            webcam.set_listener(Arc::new(auto_player));
        }

        Ok((
            Self {
                ctx,
                classifier,
                webcam,
                matches,
            },
            rx,
        ))
    }

    pub fn config(&self) -> &GameConfig {
        &self.ctx.config
    }

    pub fn score(&self) -> Score {
        self.ctx.board.lock().score()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.ctx.board.lock().history().entries()
    }

    pub fn match_state(&self) -> MatchState {
        self.matches.state()
    }

    pub fn webcam_status(&self) -> WebcamStatus {
        self.webcam.status()
    }

    pub fn last_detected(&self) -> Option<Move> {
        self.webcam.last_detected()
    }

    pub fn controls(&self) -> Controls {
        let status = self.webcam.status();
        Controls {
            start_webcam: status == WebcamStatus::Stopped,
            stop_webcam: status != WebcamStatus::Stopped,
            start_match: status == WebcamStatus::Running && !self.matches.is_active(),
        }
    }

    fn publish_controls(&self) {
        self.ctx.events.emit(GameEvent::Controls(self.controls()));
    }

    fn ensure_no_match(&self) -> Result<()> {
        if self.matches.is_active() {
            self.ctx.events.status("A match is in progress");
            return Err(GameError::MatchInProgress);
        }
        Ok(())
    }

    /// Play a round with an explicitly chosen move
    pub fn play(&self, user_move: Move) -> Result<RoundOutcome> {
        self.ensure_no_match()?;
        Ok(self.ctx.resolve(None, user_move))
    }

    /// Classify a still image and play it; `None` when no gesture was recognized
    pub async fn play_image(&self, frame: &Frame) -> Result<Option<RoundOutcome>> {
        self.ensure_no_match()?;
        self.ctx.events.status("Detecting gesture...");

        match self.classifier.classify(frame).await {
            Ok(Some(user_move)) => Ok(Some(self.ctx.resolve(None, user_move))),
            Ok(None) => {
                self.ctx
                    .events
                    .status("No hand gesture recognized. Try another image");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Image classification failed: {}", e);
                self.ctx.events.status(e.status_text());
                Err(e)
            }
        }
    }

    /// Play whatever the webcam currently sees
    pub async fn play_detected(&self) -> Result<Option<RoundOutcome>> {
        self.ensure_no_match()?;
        if !self.webcam.is_running() {
            self.ctx.events.status(GameError::WebcamNotRunning.status_text());
            return Err(GameError::WebcamNotRunning);
        }

        let detected = match self.webcam.last_detected() {
            Some(user_move) => Some(user_move),
            None => {
                let snapshot = match self.webcam.capture_frame() {
                    Ok(frame) => self.classifier.classify(&frame).await,
                    Err(e) => Err(e),
                };
                match snapshot {
                    Ok(detected) => detected,
                    Err(e) => {
                        tracing::warn!("Snapshot classification failed: {}", e);
                        self.ctx.events.status(e.status_text());
                        return Err(e);
                    }
                }
            }
        };

        match detected {
            Some(user_move) => Ok(Some(self.ctx.resolve(None, user_move))),
            None => {
                self.ctx
                    .events
                    .status("No gesture detected! Show rock, paper or scissors and try again");
                Ok(None)
            }
        }
    }

    pub async fn start_webcam(&self) -> Result<()> {
        self.ctx.events.emit(GameEvent::Controls(Controls {
            start_webcam: false,
            stop_webcam: false,
            start_match: false,
        }));
        self.ctx.events.status("Starting webcam...");

        let started = self.webcam.start().await;
        if started.is_ok() && self.webcam.is_running() {
            self.ctx.events.status("Webcam ready");
        }
        self.publish_controls();
        started
    }

    pub fn stop_webcam(&self) {
        self.matches.cancel();
        self.webcam.stop();
        self.ctx.events.status("Webcam stopped");
        self.publish_controls();
    }

    pub fn start_match(&self) -> Result<()> {
        let started = self.matches.start();
        if started.is_err() {
            self.publish_controls();
        }
        started
    }

    /// Abandon any match, release the webcam and clear score and history
    pub fn reset(&self) {
        self.matches.cancel();
        self.webcam.stop();

        let (score, history) = {
            let mut board = self.ctx.board.lock();
            board.reset();
            (board.score(), board.history().entries())
        };

        tracing::info!("Session reset");
        self.ctx.events.emit(GameEvent::Score(score));
        self.ctx.events.emit(GameEvent::History(history));
        self.ctx.events.status("Game reset");
        self.publish_controls();
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.matches.cancel();
        self.webcam.stop();
    }
}

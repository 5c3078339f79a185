//! handsign core - rock-paper-scissors played with hand gestures
//!
//! The player's move comes from an image classifier looking at a still image
//! or a live webcam feed; the computer answers with a random move. Matches
//! run a fixed number of timed rounds, each ending in a webcam snapshot.

pub mod autoplay;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod matches;
pub mod messages;
pub mod moves;
pub mod resolver;
pub mod scoreboard;
pub mod session;
pub mod webcam;

#[cfg(test)]
mod testing;

pub use classifier::{GestureClassifier, GestureModel, ModelLoader, Prediction};
pub use config::{AutoPlayConfig, CameraConfig, GameConfig, ModelConfig};
pub use error::{GameError, Result};
pub use events::{Controls, EventBus, GameEvent};
pub use frame::{Frame, FrameSource};
pub use matches::{MatchPhase, MatchState};
pub use moves::{Move, RoundOutcome, Winner};
pub use resolver::RoundResolver;
pub use scoreboard::{History, HistoryEntry, Score, Scoreboard};
pub use session::GameSession;
pub use webcam::{CaptureDevice, CaptureHandle, WebcamController, WebcamStatus};

use crate::error::{GameError, Result};
use crate::scoreboard::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted camera width or height, in pixels
pub const MAX_CAMERA_DIMENSION: u32 = 4096;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub total_rounds: u32,
    pub countdown_secs: u32,
    pub tick_interval: Duration,
    pub round_pause: Duration,
    pub history_capacity: usize,
    /// Unrecognized snapshots tolerated per round before the match is abandoned.
    /// `None` retries until a gesture is recognized or the match is reset.
    pub max_retries_per_round: Option<u32>,
    pub camera: CameraConfig,
    pub model: ModelConfig,
    pub auto_play: AutoPlayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub mirrored: bool,
    /// Delay between iterations of the live prediction loop
    pub frame_interval: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_url: String,
    pub metadata_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlayConfig {
    pub enabled: bool,
    /// Consecutive frames that must agree before a round is played
    pub stable_frames: u32,
    pub cooldown: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            countdown_secs: 3,
            tick_interval: Duration::from_secs(1),
            round_pause: Duration::from_secs(2),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_retries_per_round: None,
            camera: CameraConfig::default(),
            model: ModelConfig::default(),
            auto_play: AutoPlayConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            mirrored: true,
            frame_interval: Duration::from_millis(100),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_url: "./model/model.json".to_string(),
            metadata_url: "./model/metadata.json".to_string(),
        }
    }
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stable_frames: 5,
            cooldown: Duration::from_secs(3),
        }
    }
}

impl GameConfig {
    /// Time between entering a countdown and taking the snapshot
    pub fn countdown_duration(&self) -> Duration {
        self.tick_interval * self.countdown_secs
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_rounds == 0 {
            return Err(GameError::config("Total rounds must be greater than 0"));
        }

        if self.tick_interval.is_zero() {
            return Err(GameError::config("Tick interval must be greater than 0"));
        }

        if self.history_capacity == 0 {
            return Err(GameError::config("History capacity must be greater than 0"));
        }

        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(GameError::config("Camera dimensions must be non-zero"));
        }

        if self.camera.width > MAX_CAMERA_DIMENSION || self.camera.height > MAX_CAMERA_DIMENSION {
            return Err(GameError::config(format!(
                "Camera dimensions must be at most {}x{}",
                MAX_CAMERA_DIMENSION, MAX_CAMERA_DIMENSION
            )));
        }

        if self.camera.frame_interval.is_zero() {
            return Err(GameError::config("Frame interval must be greater than 0"));
        }

        if self.model.model_url.is_empty() {
            return Err(GameError::config("Model URL cannot be empty"));
        }

        if self.model.metadata_url.is_empty() {
            return Err(GameError::config("Metadata URL cannot be empty"));
        }

        if self.auto_play.enabled && self.auto_play.stable_frames == 0 {
            return Err(GameError::config(
                "Auto-play needs at least one stable frame",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.total_rounds, 5);
        assert_eq!(config.countdown_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let config = GameConfig {
            total_rounds: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_camera() {
        let mut config = GameConfig::default();
        config.camera.width = 70_000;
        config.camera.height = 70_000;
        assert!(matches!(config.validate(), Err(GameError::Config(_))));

        config.camera.width = MAX_CAMERA_DIMENSION;
        config.camera.height = MAX_CAMERA_DIMENSION;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"total_rounds": 3, "camera": {"mirrored": false}}"#).unwrap();
        assert_eq!(config.total_rounds, 3);
        assert_eq!(config.countdown_secs, 3);
        assert!(!config.camera.mirrored);
        assert_eq!(config.camera.width, 200);
    }
}

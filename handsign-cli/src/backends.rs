//! Terminal stand-ins for the gesture model and the camera
//!
//! The replay model reads a JSON script describing which hand the player
//! holds up and for how long. The synthetic camera hands out blank frames.

use async_trait::async_trait;
use handsign_core::{
    CaptureDevice, CaptureHandle, Frame, GameError, GestureModel, ModelLoader, Prediction,
    Result,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Longest a single step may hold, one day
const MAX_HOLD_SECS: f64 = 86_400.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayStep {
    pub hold_secs: f64,
    pub predictions: Vec<Prediction>,
}

impl ReplayStep {
    // zero for anything validate() would reject
    fn hold(&self) -> Duration {
        Duration::try_from_secs_f64(self.hold_secs.min(MAX_HOLD_SECS)).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    /// Class labels the model knows; empty means anything goes
    #[serde(default)]
    pub labels: Vec<String>,
    pub timeline: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn validate(&self) -> Result<()> {
        if self.timeline.is_empty() {
            return Err(GameError::model_load("script timeline is empty"));
        }
        for step in &self.timeline {
            if !(step.hold_secs > 0.0 && step.hold_secs <= MAX_HOLD_SECS) {
                return Err(GameError::model_load(format!(
                    "hold_secs must be in (0, {}], got {}",
                    MAX_HOLD_SECS, step.hold_secs
                )));
            }
            if self.labels.is_empty() {
                continue;
            }
            if let Some(p) = step
                .predictions
                .iter()
                .find(|p| !self.labels.iter().any(|l| l == &p.label))
            {
                return Err(GameError::model_load(format!(
                    "label '{}' is not in the model metadata",
                    p.label
                )));
            }
        }
        Ok(())
    }

    fn cycle_length(&self) -> Duration {
        self.timeline.iter().map(ReplayStep::hold).sum()
    }

    /// Predictions held up `elapsed` into the script, looping at the end
    pub fn at(&self, elapsed: Duration) -> &[Prediction] {
        let cycle = self.cycle_length();
        let mut offset = if cycle.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_nanos((elapsed.as_nanos() % cycle.as_nanos()) as u64)
        };

        for step in &self.timeline {
            let hold = step.hold();
            if offset < hold {
                return &step.predictions;
            }
            offset -= hold;
        }
        self.timeline
            .last()
            .map(|s| s.predictions.as_slice())
            .unwrap_or(&[])
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = tokio::fs::read_to_string(Path::new(path))
        .await
        .map_err(|e| GameError::model_load(format!("{}: {}", path, e)))?;
    serde_json::from_str(&raw).map_err(|e| GameError::model_load(format!("{}: {}", path, e)))
}

#[derive(Deserialize)]
struct Metadata {
    #[serde(default)]
    labels: Vec<String>,
}

/// Loads a `ReplayModel` from the model and metadata files
pub struct ReplayModelLoader;

#[async_trait]
impl ModelLoader for ReplayModelLoader {
    async fn load(&self, model_url: &str, metadata_url: &str) -> Result<Arc<dyn GestureModel>> {
        let mut script: ReplayScript = read_json(model_url).await?;
        let metadata: Metadata = read_json(metadata_url).await?;
        if !metadata.labels.is_empty() {
            script.labels = metadata.labels;
        }
        script.validate()?;

        tracing::info!(
            "Loaded replay model from {} ({} steps)",
            model_url,
            script.timeline.len()
        );
        Ok(Arc::new(ReplayModel::new(script)))
    }
}

/// Answers with whatever the script says is shown right now.
///
/// Still images always get the first step.
pub struct ReplayModel {
    script: ReplayScript,
    started: Instant,
}

impl ReplayModel {
    pub fn new(script: ReplayScript) -> Self {
        Self {
            script,
            started: Instant::now(),
        }
    }
}

#[async_trait]
impl GestureModel for ReplayModel {
    async fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>> {
        let elapsed = if frame.is_live() {
            self.started.elapsed()
        } else {
            Duration::ZERO
        };
        Ok(self.script.at(elapsed).to_vec())
    }
}

/// Camera that always grants access and produces blank frames
pub struct SyntheticCamera;

#[async_trait]
impl CaptureDevice for SyntheticCamera {
    async fn acquire(
        &self,
        width: u32,
        height: u32,
        mirrored: bool,
    ) -> Result<Box<dyn CaptureHandle>> {
        tracing::debug!(
            "Synthetic camera opened at {}x{} (mirrored: {})",
            width,
            height,
            mirrored
        );
        Ok(Box::new(SyntheticHandle {
            width,
            height,
            sequence: 0,
            released: false,
        }))
    }
}

struct SyntheticHandle {
    width: u32,
    height: u32,
    sequence: u64,
    released: bool,
}

impl CaptureHandle for SyntheticHandle {
    fn next_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(GameError::capture("camera released"));
        }
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| {
                GameError::capture(format!("frame too large: {}x{}", self.width, self.height))
            })?;
        let pixels = vec![0u8; len];
        let frame = Frame::live(self.width, self.height, pixels, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsign_core::{GestureClassifier, ModelConfig, Move};
    use std::io::Write;

    fn script() -> ReplayScript {
        ReplayScript {
            labels: vec![],
            timeline: vec![
                ReplayStep {
                    hold_secs: 2.0,
                    predictions: vec![Prediction::new("Rock", 0.9)],
                },
                ReplayStep {
                    hold_secs: 1.0,
                    predictions: vec![Prediction::new("Paper", 0.8)],
                },
            ],
        }
    }

    #[test]
    fn test_timeline_lookup_loops() {
        let script = script();
        assert_eq!(script.at(Duration::ZERO)[0].label, "Rock");
        assert_eq!(script.at(Duration::from_millis(1999))[0].label, "Rock");
        assert_eq!(script.at(Duration::from_millis(2500))[0].label, "Paper");
        assert_eq!(script.at(Duration::from_millis(3100))[0].label, "Rock");
    }

    #[test]
    fn test_validate_rejects_unknown_label() {
        let mut script = script();
        script.labels = vec!["Rock".into(), "Nothing".into()];
        assert!(script.validate().is_err());

        script.labels.push("Paper".into());
        assert!(script.validate().is_ok());

        script.timeline.clear();
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_hold() {
        for hold_secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e30] {
            let mut script = script();
            script.timeline[0].hold_secs = hold_secs;
            assert!(
                matches!(script.validate(), Err(GameError::ModelLoad(_))),
                "hold_secs {} accepted",
                hold_secs
            );
            // lookups never panic, even on a script that failed validation
            let _ = script.at(Duration::from_secs(5));
        }
    }

    #[test]
    fn test_oversized_frame_is_a_capture_error() {
        let mut handle = SyntheticHandle {
            width: u32::MAX,
            height: u32::MAX,
            sequence: 0,
            released: false,
        };
        assert!(matches!(handle.next_frame(), Err(GameError::Capture(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_model_follows_the_clock() {
        let model = ReplayModel::new(script());
        let live = Frame::live(2, 2, vec![0u8; 12], 0);
        let still = Frame::still(2, 2, vec![0u8; 12]);

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(model.predict(&live).await.unwrap()[0].label, "Paper");
        assert_eq!(model.predict(&still).await.unwrap()[0].label, "Rock");
    }

    #[tokio::test]
    async fn test_loader_reads_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"labels":["Rock","Scissor","Nothing"],"timeline":[{{"hold_secs":1.0,"predictions":[{{"label":"Scissor","probability":0.7}},{{"label":"Nothing","probability":0.3}}]}}]}}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let classifier = GestureClassifier::new(
            Arc::new(ReplayModelLoader),
            ModelConfig {
                model_url: path.clone(),
                metadata_url: path,
            },
        );
        let detected = classifier
            .classify(&Frame::still(1, 1, vec![0u8; 3]))
            .await
            .unwrap();
        assert_eq!(detected, Some(Move::Scissors));
    }

    #[tokio::test]
    async fn test_missing_script_is_a_load_error() {
        let err = ReplayModelLoader
            .load("/nonexistent/model.json", "/nonexistent/metadata.json")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GameError::ModelLoad(_)));
    }

    #[tokio::test]
    async fn test_synthetic_camera_counts_frames() {
        let mut handle = SyntheticCamera.acquire(4, 4, true).await.unwrap();
        let first = handle.next_frame().unwrap();
        let second = handle.next_frame().unwrap();
        assert_eq!(first.source, handsign_core::FrameSource::Live { sequence: 0 });
        assert_eq!(second.source, handsign_core::FrameSource::Live { sequence: 1 });

        handle.release();
        assert!(handle.next_frame().is_err());
    }
}

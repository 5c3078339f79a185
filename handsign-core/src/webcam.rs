//! Webcam lifecycle and the live prediction loop

use crate::classifier::{GestureClassifier, Prediction};
use crate::config::CameraConfig;
use crate::error::{GameError, Result};
use crate::events::{EventBus, GameEvent};
use crate::frame::Frame;
use crate::moves::Move;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn acquire(
        &self,
        width: u32,
        height: u32,
        mirrored: bool,
    ) -> Result<Box<dyn CaptureHandle>>;
}

/// An acquired capture session
pub trait CaptureHandle: Send {
    fn next_frame(&mut self) -> Result<Frame>;
    fn release(&mut self);
}

/// Receives every classification made by the live loop
pub trait DetectionListener: Send + Sync {
    fn on_detection(&self, detected: Option<Move>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WebcamStatus {
    Stopped,
    Starting,
    Running,
}

struct WebcamInner {
    status: WebcamStatus,
    handle: Option<Box<dyn CaptureHandle>>,
    // bumped on every start and stop; a loop or pending start from an older
    // generation must not touch the device
    generation: u64,
    last_detected: Option<Move>,
    last_predictions: Vec<Prediction>,
}

pub struct WebcamController {
    device: Arc<dyn CaptureDevice>,
    classifier: Arc<GestureClassifier>,
    config: CameraConfig,
    events: EventBus,
    inner: Arc<Mutex<WebcamInner>>,
    listener: Arc<Mutex<Option<Arc<dyn DetectionListener>>>>,
}

impl WebcamController {
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        classifier: Arc<GestureClassifier>,
        config: CameraConfig,
        events: EventBus,
    ) -> Self {
        Self {
            device,
            classifier,
            config,
            events,
            inner: Arc::new(Mutex::new(WebcamInner {
                status: WebcamStatus::Stopped,
                handle: None,
                generation: 0,
                last_detected: None,
                last_predictions: Vec::new(),
            })),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_listener(&self, listener: Arc<dyn DetectionListener>) {
        *self.listener.lock() = Some(listener);
    }

    pub fn status(&self) -> WebcamStatus {
        self.inner.lock().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == WebcamStatus::Running
    }

    pub fn last_detected(&self) -> Option<Move> {
        self.inner.lock().last_detected
    }

    pub fn last_predictions(&self) -> Vec<Prediction> {
        self.inner.lock().last_predictions.clone()
    }

    /// Acquire the device and start the live prediction loop.
    ///
    /// Does nothing if the webcam is already running or starting.
    pub async fn start(&self) -> Result<()> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.status != WebcamStatus::Stopped {
                tracing::debug!("Webcam start ignored, status is {:?}", inner.status);
                return Ok(());
            }
            inner.status = WebcamStatus::Starting;
            inner.generation += 1;
            inner.generation
        };

        tracing::info!(
            "Acquiring webcam {}x{} (mirrored: {})",
            self.config.width,
            self.config.height,
            self.config.mirrored
        );
        let acquired = self
            .device
            .acquire(self.config.width, self.config.height, self.config.mirrored)
            .await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            // stopped while the device was being acquired
            if let Ok(mut handle) = acquired {
                handle.release();
            }
            return Ok(());
        }

        match acquired {
            Ok(handle) => {
                inner.handle = Some(handle);
                inner.status = WebcamStatus::Running;
                drop(inner);

                tracing::info!("Webcam running (session {})", generation);
                self.events.emit(GameEvent::WebcamStarted);
                self.spawn_prediction_loop(generation);
                Ok(())
            }
            Err(e) => {
                inner.status = WebcamStatus::Stopped;
                drop(inner);

                let err = match e {
                    GameError::WebcamAcquisition(_) => e,
                    other => GameError::webcam(other.to_string()),
                };
                tracing::warn!("Webcam start failed: {}", err);
                self.events.status(err.status_text());
                Err(err)
            }
        }
    }

    /// Release the device and clear everything derived from it
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.status == WebcamStatus::Stopped {
            return;
        }

        inner.generation += 1;
        inner.status = WebcamStatus::Stopped;
        if let Some(mut handle) = inner.handle.take() {
            handle.release();
        }
        inner.last_detected = None;
        inner.last_predictions.clear();
        drop(inner);

        tracing::info!("Webcam stopped");
        self.events.emit(GameEvent::WebcamStopped);
    }

    /// Grab a single frame from the running session
    pub fn capture_frame(&self) -> Result<Frame> {
        let mut inner = self.inner.lock();
        if inner.status != WebcamStatus::Running {
            return Err(GameError::WebcamNotRunning);
        }
        let handle = inner.handle.as_mut().ok_or(GameError::WebcamNotRunning)?;
        handle.next_frame().map_err(|e| match e {
            GameError::Capture(_) => e,
            other => GameError::capture(other.to_string()),
        })
    }

    fn spawn_prediction_loop(&self, generation: u64) {
        let inner = self.inner.clone();
        let classifier = self.classifier.clone();
        let events = self.events.clone();
        let listener = self.listener.clone();
        let interval = self.config.frame_interval;

        tokio::spawn(async move {
            let mut reported_failure = false;

            loop {
                let frame = match grab_live_frame(&inner, generation) {
                    Some(frame) => frame,
                    None => break,
                };

                let predicted = match frame {
                    Ok(frame) => classifier.predict(&frame).await,
                    Err(e) => Err(e),
                };

                match predicted {
                    Ok(predictions) => {
                        reported_failure = false;
                        let detected = GestureClassifier::interpret(&predictions);
                        let changed = {
                            let mut guard = inner.lock();
                            if guard.generation != generation {
                                break;
                            }
                            let changed = guard.last_detected != detected;
                            guard.last_detected = detected;
                            guard.last_predictions = predictions.clone();
                            changed
                        };

                        events.emit(GameEvent::Predictions(predictions));
                        if changed {
                            events.emit(GameEvent::Detected(detected));
                        }

                        let listener = listener.lock().clone();
                        if let Some(listener) = listener {
                            listener.on_detection(detected);
                        }
                    }
                    Err(e) => {
                        if !reported_failure {
                            tracing::warn!("Live prediction failed: {}", e);
                            events.status(e.status_text());
                            reported_failure = true;
                        }
                    }
                }

                tokio::time::sleep(interval).await;
            }

            tracing::debug!("Prediction loop for webcam session {} exited", generation);
        });
    }
}

// None once the loop's session is gone
fn grab_live_frame(inner: &Mutex<WebcamInner>, generation: u64) -> Option<Result<Frame>> {
    let mut guard = inner.lock();
    if guard.generation != generation || guard.status != WebcamStatus::Running {
        return None;
    }
    guard.handle.as_mut().map(|handle| handle.next_frame())
}

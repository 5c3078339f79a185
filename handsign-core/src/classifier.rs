//! Gesture classifier adapter
//!
//! Wraps an opaque image-classification model. The model is loaded lazily on
//! first use and shared afterwards; concurrent callers during the first load
//! all wait on the same in-flight load.

use crate::config::ModelConfig;
use crate::error::{GameError, Result};
use crate::frame::Frame;
use crate::moves::Move;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One ranked label from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

#[async_trait]
pub trait GestureModel: Send + Sync {
    async fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>>;
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_url: &str, metadata_url: &str) -> Result<Arc<dyn GestureModel>>;
}

/// Highest-probability prediction; on equal probabilities the earliest entry wins
pub fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut best: Option<&Prediction> = None;
    for p in predictions {
        match best {
            Some(b) if b.probability >= p.probability => {}
            _ => best = Some(p),
        }
    }
    best
}

pub struct GestureClassifier {
    loader: Arc<dyn ModelLoader>,
    config: ModelConfig,
    model: OnceCell<Arc<dyn GestureModel>>,
}

impl GestureClassifier {
    pub fn new(loader: Arc<dyn ModelLoader>, config: ModelConfig) -> Self {
        Self {
            loader,
            config,
            model: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Load the model once; later calls reuse it
    pub async fn model(&self) -> Result<&Arc<dyn GestureModel>> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!("Loading gesture model from {}", self.config.model_url);
                let model = self
                    .loader
                    .load(&self.config.model_url, &self.config.metadata_url)
                    .await
                    .map_err(|e| match e {
                        GameError::ModelLoad(_) => e,
                        other => GameError::model_load(other.to_string()),
                    })?;
                tracing::info!("Gesture model ready");
                Ok(model)
            })
            .await
    }

    /// Ranked labels for a frame
    pub async fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>> {
        let model = self.model().await?;
        model.predict(frame).await.map_err(|e| match e {
            GameError::Classification(_) => e,
            other => GameError::classification(other.to_string()),
        })
    }

    /// Classify a frame into a move.
    ///
    /// `Ok(None)` means the model ran but the top label is not a move.
    pub async fn classify(&self, frame: &Frame) -> Result<Option<Move>> {
        let predictions = self.predict(frame).await?;
        Ok(Self::interpret(&predictions))
    }

    pub fn interpret(predictions: &[Prediction]) -> Option<Move> {
        let top = top_prediction(predictions)?;
        let detected = Move::from_label(&top.label);
        if detected.is_none() {
            tracing::debug!("Unrecognized gesture label '{}'", top.label);
        }
        detected
    }
}

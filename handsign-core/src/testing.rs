//! Test doubles for the model and capture device

use crate::classifier::{GestureModel, ModelLoader, Prediction};
use crate::error::{GameError, Result};
use crate::frame::Frame;
use crate::webcam::{CaptureDevice, CaptureHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

struct HandState {
    hand: Mutex<Vec<Prediction>>,
    calls: AtomicUsize,
    loads: AtomicUsize,
    failing: AtomicBool,
}

/// Model whose answer is whatever hand the test is currently "showing"
#[derive(Clone)]
pub(crate) struct HandModel {
    state: Arc<HandState>,
}

impl HandModel {
    pub fn showing(label: &str) -> Self {
        let model = Self {
            state: Arc::new(HandState {
                hand: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                loads: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }),
        };
        model.show(label);
        model
    }

    pub fn show(&self, label: &str) {
        *self.state.hand.lock() = vec![
            Prediction::new(label, 0.9),
            Prediction::new("Nothing", 0.1),
        ];
    }

    pub fn show_nothing(&self) {
        *self.state.hand.lock() = vec![
            Prediction::new("Nothing", 0.8),
            Prediction::new("Rock", 0.2),
        ];
    }

    pub fn fail(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for HandModel {
    async fn load(&self, _model_url: &str, _metadata_url: &str) -> Result<Arc<dyn GestureModel>> {
        self.state.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl GestureModel for HandModel {
    async fn predict(&self, _frame: &Frame) -> Result<Vec<Prediction>> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(GameError::classification("inference backend crashed"));
        }
        Ok(self.state.hand.lock().clone())
    }
}

pub(crate) struct FakeCamera {
    denied: bool,
    acquisitions: AtomicUsize,
    releases: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            denied: false,
            acquisitions: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new()
        }
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for FakeCamera {
    async fn acquire(
        &self,
        width: u32,
        height: u32,
        _mirrored: bool,
    ) -> Result<Box<dyn CaptureHandle>> {
        if self.denied {
            return Err(GameError::webcam("permission denied"));
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeHandle {
            width,
            height,
            sequence: AtomicU64::new(0),
            releases: self.releases.clone(),
        }))
    }
}

struct FakeHandle {
    width: u32,
    height: u32,
    sequence: AtomicU64,
    releases: Arc<AtomicUsize>,
}

impl CaptureHandle for FakeHandle {
    fn next_frame(&mut self) -> Result<Frame> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| GameError::capture("frame too large"))?;
        let pixels = vec![0u8; len];
        Ok(Frame::live(self.width, self.height, pixels, sequence))
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

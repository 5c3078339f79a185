use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameSource {
    /// A decoded still image, e.g. an uploaded file
    Still,
    /// A frame grabbed from a running capture session
    Live { sequence: u64 },
}

/// An image handed to the gesture model
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
    pub source: FrameSource,
}

impl Frame {
    pub fn still(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
            source: FrameSource::Still,
        }
    }

    pub fn live(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>, sequence: u64) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
            source: FrameSource::Live { sequence },
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.source, FrameSource::Live { .. })
    }
}

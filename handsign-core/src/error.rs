use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Webcam acquisition error: {0}")]
    WebcamAcquisition(String),

    #[error("Webcam is not running")]
    WebcamNotRunning,

    #[error("A match is already in progress")]
    MatchInProgress,

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn webcam(msg: impl Into<String>) -> Self {
        Self::WebcamAcquisition(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short text shown to the player when this error ends an action.
    pub fn status_text(&self) -> String {
        match self {
            GameError::ModelLoad(_) => "Could not load the gesture model".to_string(),
            GameError::Classification(_) => "Gesture detection failed".to_string(),
            GameError::WebcamAcquisition(_) => {
                "Could not access the webcam. Check permissions and try again".to_string()
            }
            GameError::WebcamNotRunning => "Start the webcam first".to_string(),
            GameError::Capture(_) => "Could not read a frame from the webcam".to_string(),
            GameError::MatchInProgress => "A match is in progress".to_string(),
            _ => format!("Error: {}", self),
        }
    }
}

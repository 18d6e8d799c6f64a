use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error("capture config error: {0}")]
    Config(String),
    #[error("body processing failed: {0}")]
    Privacy(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

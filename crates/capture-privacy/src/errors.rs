use payload_capture_types::CaptureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrivacyError {
    #[error("unsupported json path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("malformed json body: {0}")]
    MalformedJson(String),
    #[error("redacted body could not be serialized: {0}")]
    Serialization(String),
    #[error("multipart body without boundary")]
    MissingBoundary,
}

pub type PrivacyResult<T> = Result<T, PrivacyError>;

impl From<PrivacyError> for CaptureError {
    fn from(value: PrivacyError) -> Self {
        CaptureError::Privacy(value.to_string())
    }
}

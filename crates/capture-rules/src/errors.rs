use payload_capture_types::CaptureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid capture config: {0}")]
    Invalid(String),
    #[error("invalid uri pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type RulesResult<T> = Result<T, RulesError>;

impl From<RulesError> for CaptureError {
    fn from(value: RulesError) -> Self {
        CaptureError::Config(value.to_string())
    }
}

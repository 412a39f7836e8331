use thiserror::Error;

#[derive(Debug, Error)]
pub enum LuminaError {
    /// Rejected before any remote call: empty prompt, or image-to-image without references.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(String),

    /// Every unit of a batch failed.
    #[error("Generation failed. Please try again.")]
    NoOutputError { requested: usize },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for LuminaError {
    fn from(error: serde_json::Error) -> Self {
        LuminaError::SerializationError(error.to_string())
    }
}

impl From<reqwest::Error> for LuminaError {
    fn from(error: reqwest::Error) -> Self {
        LuminaError::TransportError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LuminaError>;

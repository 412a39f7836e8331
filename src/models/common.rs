use serde::{Deserialize, Serialize};

/// Settled result of one generation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum GenerationOutcome {
    Success(String),
    Failure(String),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Success(url) => Some(url),
            GenerationOutcome::Failure(_) => None,
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            GenerationOutcome::Success(url) => Some(url),
            GenerationOutcome::Failure(_) => None,
        }
    }
}

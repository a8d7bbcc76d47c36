//! Domain error taxonomy shared by every operation.
//!
//! Each operation returns `Result<_, MemoryError>`. The router turns an error into a
//! structured payload with an HTTP-style status, so transports always respond.

use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown collection or unknown route.
    #[error("{0}")]
    NotFound(String),

    /// Two embeddings of different length were compared.
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The embedding provider or the vector store failed or timed out.
    #[error("{0}")]
    Downstream(String),

    /// The external sync process exited non-zero.
    #[error("sync failed: {summary}")]
    SyncFailure { summary: String, output: Vec<String> },
}

pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn downstream(msg: impl Into<String>) -> Self {
        Self::Downstream(msg.into())
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::DimensionMismatch { .. } | Self::Downstream(_) | Self::SyncFailure { .. } => 500,
        }
    }

    /// Stable snake_case tag, included in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::Downstream(_) => "downstream_failure",
            Self::SyncFailure { .. } => "sync_failure",
        }
    }

    /// Only collaborator failures could succeed on a second attempt. Nothing retries today.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Downstream(_))
    }

    /// JSON body returned to clients.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            Self::SyncFailure { summary, output } => json!({
                "error": self.to_string(),
                "kind": self.kind(),
                "success": false,
                "output": output,
                "summary": summary,
            }),
            _ => json!({
                "error": self.to_string(),
                "kind": self.kind(),
            }),
        }
    }
}

impl From<reqwest::Error> for MemoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Downstream(format!("request timed out: {err}"))
        } else {
            Self::Downstream(err.to_string())
        }
    }
}

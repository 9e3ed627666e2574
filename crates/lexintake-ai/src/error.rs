use std::time::Duration;

use thiserror::Error;

/// Failure of an analyzer call. Callers answer it with the rule-based path.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer cannot be constructed, e.g. no API credential.
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),
}

impl AnalyzerError {
    /// Short machine-readable label for logs and fallback reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Transport(_) => "transport",
            Self::Upstream { .. } => "upstream",
            Self::Malformed(_) => "malformed",
            Self::Json(_) => "json",
            Self::Timeout(_) => "timeout",
        }
    }
}

//! Error taxonomy for the pipeline.
//!
//! Per-item errors (fetch, extraction, malformed verdict) are caught
//! by the orchestrator, logged, and turn into a skipped item. Input
//! and store errors are fatal.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Page fetch failed (network, timeout, non-2xx status)
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Extraction or classification service call failed
    #[error("extraction service error: {0}")]
    ExtractionService(#[from] openai_client::OpenAIError),

    /// Classifier response was not a well-formed verdict
    #[error("malformed verdict: {0}")]
    MalformedVerdict(String),

    /// Batch input file missing or invalid (fatal)
    #[error("invalid input: {0}")]
    Input(String),

    /// Snapshot or changes artifact could not be written (fatal)
    #[error("store error: {0}")]
    Store(#[from] std::io::Error),
}

impl WatchError {
    /// Whether this error aborts the run rather than skipping one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WatchError::Input(_) | WatchError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(WatchError::Input("missing file".into()).is_fatal());
        assert!(!WatchError::Fetch {
            url: "https://a.test".into(),
            reason: "timeout".into(),
        }
        .is_fatal());
        assert!(!WatchError::MalformedVerdict("not an object".into()).is_fatal());
    }
}

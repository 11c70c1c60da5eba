use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (url, topic) unit of work for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub url: String,
    pub topic: String,
}

/// Topic-relevant text extracted from a page, as persisted in the
/// snapshot and compared across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub url: String,
    pub topic: String,
    pub text: String,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionResult {
    pub fn new(url: impl Into<String>, topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            topic: topic.into(),
            text: text.into(),
            extracted_at: Utc::now(),
        }
    }
}

/// Notification that a URL's relevant content changed since the last run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub url: String,
    pub topic: String,
    /// Human summary of what changed
    pub title: String,
}

/// Title used when a URL has no previous snapshot entry.
pub const NEW_ENTRY_TITLE: &str = "new entry";

/// Fallback title when the classifier flags a change but omits one.
pub const UPDATED_TITLE: &str = "content updated";

/// Validated changed/title response from the change classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub changed: bool,
    pub title: Option<String>,
}

/// Why a work item was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Fetch(String),
    Extraction(String),
    Classification(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch: {e}"),
            SkipReason::Extraction(e) => write!(f, "extraction: {e}"),
            SkipReason::Classification(e) => write!(f, "classification: {e}"),
        }
    }
}

/// Outcome of one work item. Skips carry the reason so the run report
/// can surface them; they never abort the batch.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Processed(ExtractionResult),
    Skipped { url: String, reason: SkipReason },
}

/// Terminal state of a run, distinguishable by exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    ChangesFound,
    NoChanges,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::ChangesFound => 0,
            RunStatus::NoChanges => 1,
        }
    }
}

/// Aggregated result of a batch run.
#[derive(Debug)]
pub struct RunReport {
    /// All successfully processed extractions (the next snapshot, if persisted)
    pub results: Vec<ExtractionResult>,
    /// Flagged changes only
    pub changes: Vec<ChangeRecord>,
    /// Items dropped by per-item failures
    pub skipped: Vec<(String, SkipReason)>,
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_outcomes() {
        assert_eq!(RunStatus::ChangesFound.exit_code(), 0);
        assert_eq!(RunStatus::NoChanges.exit_code(), 1);
    }

    #[test]
    fn test_extraction_result_roundtrip() {
        let result = ExtractionResult::new("https://a.test", "trains", "schedule changed");
        let json = serde_json::to_string(&result).unwrap();
        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::Fetch("HTTP 503".into());
        assert_eq!(reason.to_string(), "fetch: HTTP 503");
    }
}

//! Topic-aware web page change detection.
//!
//! Fetches a batch of pages, reduces each to visible text, extracts
//! the topic-relevant parts through an LLM, and compares the result
//! against the previous run's snapshot with a semantic change
//! classifier. Changes are written to a report and the snapshot is
//! replaced — but only on runs that actually found something.

pub mod batch;
pub mod clean;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod run;
pub mod store;
pub mod types;

pub use config::Config;
pub use detector::{detect, ChangeClassifier, OpenAiClassifier};
pub use error::{Result, WatchError};
pub use extractor::{OpenAiExtractor, TopicExtractor};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use store::SnapshotStore;
pub use types::{
    ChangeRecord, ExtractionResult, ItemOutcome, RunReport, RunStatus, SkipReason, Verdict,
    WorkItem,
};

//! Run orchestration.
//!
//! Sequential per-item pipeline: fetch, clean, extract, detect. Each
//! item produces an explicit outcome; per-item failures become skips
//! and never abort the batch. Persistence is gated on at least one
//! detected change, so a run with nothing to report leaves the
//! snapshot file untouched.

use crate::clean;
use crate::detector::{detect, ChangeClassifier};
use crate::error::Result;
use crate::extractor::{TopicExtractor, MAX_PAGE_TEXT_BYTES};
use crate::fetcher::PageFetcher;
use crate::store::{self, SnapshotStore};
use crate::types::{
    ChangeRecord, ExtractionResult, ItemOutcome, RunReport, RunStatus, SkipReason, WorkItem,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Run the full pipeline: load the snapshot, process the batch, and
/// persist the changes artifact and new snapshot when changes exist.
pub async fn run(
    items: &[WorkItem],
    snapshot_store: &SnapshotStore,
    changes_path: &Path,
    fetcher: &dyn PageFetcher,
    extractor: &dyn TopicExtractor,
    classifier: &dyn ChangeClassifier,
) -> Result<RunReport> {
    let previous = snapshot_store.load();
    let report = run_batch(items, &previous, fetcher, extractor, classifier).await;

    if report.changes.is_empty() {
        info!(
            processed = report.results.len(),
            skipped = report.skipped.len(),
            "No changes detected, snapshot left untouched"
        );
    } else {
        store::write_changes(changes_path, &report.changes)?;
        snapshot_store.save(&report.results)?;
        info!(
            processed = report.results.len(),
            changes = report.changes.len(),
            skipped = report.skipped.len(),
            snapshot = %snapshot_store.path().display(),
            "Changes detected, snapshot replaced"
        );
    }

    Ok(report)
}

/// Process a batch against a loaded snapshot. Pure over its
/// collaborators; does not touch the filesystem.
pub async fn run_batch(
    items: &[WorkItem],
    previous: &HashMap<String, ExtractionResult>,
    fetcher: &dyn PageFetcher,
    extractor: &dyn TopicExtractor,
    classifier: &dyn ChangeClassifier,
) -> RunReport {
    let mut results = Vec::new();
    let mut changes = Vec::new();
    let mut skipped = Vec::new();

    for item in items {
        let (outcome, change) = process_item(item, previous, fetcher, extractor, classifier).await;
        match outcome {
            ItemOutcome::Processed(result) => results.push(result),
            ItemOutcome::Skipped { url, reason } => {
                warn!(url = %url, reason = %reason, "Work item skipped");
                skipped.push((url, reason));
            }
        }
        changes.extend(change);
    }

    let status = if changes.is_empty() {
        RunStatus::NoChanges
    } else {
        RunStatus::ChangesFound
    };

    RunReport {
        results,
        changes,
        skipped,
        status,
    }
}

async fn process_item(
    item: &WorkItem,
    previous: &HashMap<String, ExtractionResult>,
    fetcher: &dyn PageFetcher,
    extractor: &dyn TopicExtractor,
    classifier: &dyn ChangeClassifier,
) -> (ItemOutcome, Option<ChangeRecord>) {
    let skip = |reason: SkipReason| {
        (
            ItemOutcome::Skipped {
                url: item.url.clone(),
                reason,
            },
            None,
        )
    };

    let html = match fetcher.fetch(&item.url).await {
        Ok(html) => html,
        Err(e) => return skip(SkipReason::Fetch(e.to_string())),
    };

    let text = clean::visible_text_capped(&html, MAX_PAGE_TEXT_BYTES);

    let extracted = match extractor.extract(&text, &item.topic).await {
        Ok(extracted) => extracted,
        Err(e) => return skip(SkipReason::Extraction(e.to_string())),
    };

    let current = ExtractionResult::new(&item.url, &item.topic, extracted);

    match detect(previous.get(&item.url), &current, classifier).await {
        Ok(change) => (ItemOutcome::Processed(current), change),
        Err(e) => skip(SkipReason::Classification(e.to_string())),
    }
}

//! Batch input.
//!
//! The input file is a JSON array of `{url, topic}` records. Any
//! violation is fatal and aborts the run before processing starts.

use crate::error::{Result, WatchError};
use crate::types::WorkItem;
use std::fs;
use std::path::Path;
use url::Url;

/// Read and validate the batch input file.
pub fn read_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let data = fs::read_to_string(path)
        .map_err(|e| WatchError::Input(format!("cannot read {}: {e}", path.display())))?;

    let items: Vec<WorkItem> = serde_json::from_str(&data)
        .map_err(|e| WatchError::Input(format!("cannot parse {}: {e}", path.display())))?;

    for item in &items {
        validate(item)?;
    }

    Ok(items)
}

fn validate(item: &WorkItem) -> Result<()> {
    if item.url.trim().is_empty() {
        return Err(WatchError::Input("work item has an empty url".to_string()));
    }

    let parsed = Url::parse(&item.url)
        .map_err(|e| WatchError::Input(format!("invalid url {:?}: {e}", item.url)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(WatchError::Input(format!(
            "unsupported url scheme {:?} in {:?}",
            parsed.scheme(),
            item.url
        )));
    }

    if item.topic.trim().is_empty() {
        return Err(WatchError::Input(format!(
            "work item for {:?} has an empty topic",
            item.url
        )));
    }

    Ok(())
}

//! Snapshot persistence.
//!
//! The snapshot is a JSON list of the last-known extraction per URL.
//! Loading is tolerant: an absent or malformed file degrades to an
//! empty baseline (every URL then classifies as new). Saving replaces
//! the whole file atomically and is only invoked when the run found
//! at least one change.

use crate::error::Result;
use crate::types::{ChangeRecord, ExtractionResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed snapshot store.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous run's snapshot, keyed by URL.
    ///
    /// Absent or unreadable snapshots are an empty baseline, never an
    /// error.
    pub fn load(&self) -> HashMap<String, ExtractionResult> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No snapshot to load, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<Vec<ExtractionResult>>(&data) {
            Ok(entries) => {
                debug!(path = %self.path.display(), entries = entries.len(), "Loaded snapshot");
                entries.into_iter().map(|e| (e.url.clone(), e)).collect()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed snapshot, treating as empty");
                HashMap::new()
            }
        }
    }

    /// Replace the persisted snapshot with the given results.
    ///
    /// Writes to a sibling temp file and renames over the target so a
    /// crash mid-write cannot leave a truncated snapshot.
    pub fn save(&self, results: &[ExtractionResult]) -> Result<()> {
        let data = serde_json::to_string_pretty(results)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_atomically(&self.path, &data)?;
        debug!(path = %self.path.display(), entries = results.len(), "Snapshot saved");
        Ok(())
    }
}

/// Write the changes artifact.
pub fn write_changes(path: &Path, changes: &[ChangeRecord]) -> Result<()> {
    let data = serde_json::to_string_pretty(changes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    write_atomically(path, &data)?;
    debug!(path = %path.display(), records = changes.len(), "Changes written");
    Ok(())
}

fn write_atomically(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

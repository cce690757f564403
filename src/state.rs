//! Send-state persistence.
//!
//! A single JSON file records the last `(date, period)` for which a
//! digest was dispatched. Reads are tolerant: a missing or corrupt file
//! means "nothing sent yet". Writes are fire-and-forget: failures are
//! logged and swallowed, never fatal to a run.

use crate::clock::Period;
use crate::error::{BriefError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// Marker of the last successfully dispatched digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
    /// Local calendar date of the send.
    pub date: NaiveDate,
    /// Period of the send.
    pub period: Period,
}

/// Load the stored record. `None` when the file is missing, unreadable,
/// or unparsable.
pub fn load_record(path: &Path) -> Option<SendRecord> {
    let bytes = std::fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("ignoring corrupt send-state file {}: {e}", path.display());
            None
        }
    }
}

/// Persist a record, logging and swallowing any failure.
pub fn write_record(path: &Path, record: &SendRecord) {
    if let Err(e) = try_write(path, record) {
        error!("cannot persist send state to {}: {e}", path.display());
    }
}

fn try_write(path: &Path, record: &SendRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            BriefError::State(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| BriefError::State(format!("cannot serialize send state: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| BriefError::State(format!("cannot write {}: {e}", path.display())))
}

//! Flat JSON record file holding the history, most recent first.
//!
//! ```json
//! [
//!   { "text": "most recent", "datetime": 1700000100 },
//!   { "text": "older",       "datetime": 1700000000 }
//! ]
//! ```

use crate::history::Entry;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const HISTORY_FILE_NAME: &str = "clipboard_history";

pub fn read(path: &Path) -> Result<Vec<Entry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = serde_json::from_str(&content)
        .with_context(|| format!("Malformed history file {}", path.display()))?;
    Ok(entries)
}

/// Reads the history file, treating any failure as an empty history.
pub fn load(path: &Path) -> Vec<Entry> {
    match read(path) {
        Ok(entries) => {
            debug!("Read {} history entries from {}", entries.len(), path.display());
            entries
        }
        Err(e) if is_not_found(&e) => {
            debug!("No history file at {}", path.display());
            Vec::new()
        }
        Err(e) => {
            warn!("Discarding stored history: {:#}", e);
            Vec::new()
        }
    }
}

/// Writes `entries` in the given order, replacing the file atomically.
pub fn save(path: &Path, entries: &[Entry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(entries)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }

    debug!("Wrote {} history entries to {}", entries.len(), path.display());
    Ok(())
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_keeps_order_and_timestamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        let entries = vec![Entry::new("X", 1_700_000_200), Entry::new("Y", 1_700_000_100)];

        save(&path, &entries).unwrap();
        assert_eq!(load(&path), entries);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(load(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_empty());
        assert!(read(&path).is_err());
    }

    #[test]
    fn wrong_shape_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(&path, r#"[{"text": "a"}]"#).unwrap();
        assert!(load(&path).is_empty());
    }

    #[test]
    fn record_fields_are_text_and_datetime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        save(&path, &[Entry::new("hello", 42)]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([{ "text": "hello", "datetime": 42 }]));
    }

    #[test]
    fn failed_replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        assert!(save(&path, &[Entry::new("x", 1)]).is_err());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join(HISTORY_FILE_NAME);
        save(&path, &[Entry::new("x", 1)]).unwrap();
        assert_eq!(load(&path).len(), 1);
    }
}

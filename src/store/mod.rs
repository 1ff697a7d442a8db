//! File-backed persistence for settings, recorded callbacks, saved cards and the
//! order counter.
//!
//! Everything lives as small JSON/text files under one data directory. Reads never
//! fail outward: a missing or corrupt file reads as empty (or default settings).
//! Writes go through a single mutex so read-modify-write updates do not interleave.

pub mod callbacks;
pub mod cards;
pub mod order_counter;
pub mod settings_file;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::settings::MerchantConfig;

pub use callbacks::{CallbackData, CallbackKind, CallbackRecord};
pub use cards::CardRecord;

/// Number of callbacks and cards retained on disk
pub const HISTORY_LIMIT: usize = 50;

pub const SETTINGS_FILE: &str = "settings.json";
pub const CALLBACKS_FILE: &str = "callbacks.json";
pub const CARDS_FILE: &str = "cards.json";
pub const ORDER_COUNTER_FILE: &str = "order_counter.txt";

/// Error type for store operations
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Source of per-request settings snapshots
pub trait SettingsSource {
    /// Current settings. Never fails; falls back to defaults.
    fn snapshot(&self) -> MerchantConfig;
}

/// Sink for inbound gateway requests, keyed by transaction token
pub trait CallbackSink {
    fn record(&self, token: &str, data: CallbackData) -> Result<(), StoreError>;
}

/// Store rooted at a data directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Read and parse a JSON file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Read a JSON list, treating a missing or unreadable file as empty.
///
/// Entries are parsed one by one; an entry that does not fit `T` is skipped so the
/// rest of the list survives the next rewrite.
pub(crate) fn read_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }

    let entries: Vec<JsonValue> = match read_json(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping entry {} of {}: {}", index, path.display(), e);
                None
            }
        })
        .collect()
}

/// Write pretty JSON, creating the parent directory if needed
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Keep only the newest `limit` entries
pub(crate) fn keep_newest<T>(items: &mut Vec<T>, limit: usize) {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
}

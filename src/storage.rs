use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, warn};

/// Serialized date→count activity record.
pub const RECORD_KEY: &str = "activity-record";
/// Configured session duration, minutes as a decimal string.
pub const DURATION_KEY: &str = "timer-duration";
/// Last local date observed by the rollover watcher.
pub const LAST_SEEN_KEY: &str = "last-seen-date";

/// String key-value store backed by a single JSON document on disk. Reads and
/// writes whole values only; persistence is best-effort, so a failed write
/// leaves the in-memory state intact and the current session keeps working.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Store {
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Loads the store from disk. A missing file is a fresh first run; an
    /// unreadable or unparseable file is logged and treated the same way.
    pub async fn load(path: PathBuf) -> Self {
        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse store file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read store file: {err}");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Writes the store to disk. Failures (quota, permissions) are logged and
    /// swallowed: persistence is best-effort and must never take down the
    /// countdown.
    pub async fn persist(&self) {
        let payload = match serde_json::to_vec_pretty(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to serialize store: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, payload).await {
            warn!("failed to persist store to {}: {err}", self.path.display());
        }
    }

    /// Fire-and-forget persist for callers inside abortable tasks: the
    /// document is snapshotted synchronously and the write runs on a
    /// detached task, so cancelling the caller cannot sever it. Same
    /// best-effort semantics as `persist`.
    pub fn persist_detached(&self) {
        let payload = match serde_json::to_vec_pretty(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to serialize store: {err}");
                return;
            }
        };
        let path = self.path.clone();
        tokio::spawn(async move {
            if let Err(err) = fs::write(&path, payload).await {
                warn!("failed to persist store to {}: {err}", path.display());
            }
        });
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }
    PathBuf::from("data/state.json")
}

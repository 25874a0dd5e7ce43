//! File-backed watch store
//!
//! Keeps the whole watch state in memory behind a lock and persists it as
//! three independent records under one data directory: `subscribers.txt`
//! (one chat id per line), `handles.json` (sorted array), and
//! `seen_posters.json` (handle to sorted poster array). A missing or
//! corrupt record degrades to empty with a warning instead of failing
//! startup; the other records still load.

use async_trait::async_trait;
use poster_watch_domain::{Handle, PosterId, StoreError, SubscriberId, WatchStatus, WatchStore};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const SUBSCRIBERS_FILE: &str = "subscribers.txt";
const HANDLES_FILE: &str = "handles.json";
const SEEN_POSTERS_FILE: &str = "seen_posters.json";

#[derive(Debug, Default, Clone)]
struct WatchState {
    subscribers: BTreeSet<SubscriberId>,
    handles: BTreeSet<Handle>,
    seen: BTreeMap<Handle, BTreeSet<PosterId>>,
}

/// Watch store persisted to plain files
pub struct FileWatchStore {
    data_dir: PathBuf,
    state: RwLock<WatchState>,
}

impl FileWatchStore {
    /// Open the store under `data_dir`, creating the directory if needed
    /// and loading whatever records already exist.
    pub async fn load(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        let state = WatchState {
            subscribers: read_subscribers(&data_dir.join(SUBSCRIBERS_FILE)).await,
            handles: read_json_record(&data_dir.join(HANDLES_FILE)).await,
            seen: read_json_record(&data_dir.join(SEEN_POSTERS_FILE)).await,
        };

        tracing::info!(
            subscribers = state.subscribers.len(),
            handles = state.handles.len(),
            "Loaded watch state"
        );

        Ok(Self {
            data_dir,
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, WatchState>, StoreError> {
        self.state.read().map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, WatchState>, StoreError> {
        self.state.write().map_err(|e| StoreError::Lock(e.to_string()))
    }
}

#[async_trait]
impl WatchStore for FileWatchStore {
    async fn handles(&self) -> Result<Vec<Handle>, StoreError> {
        Ok(self.read()?.handles.iter().cloned().collect())
    }

    async fn add_handle(&self, handle: &Handle) -> Result<bool, StoreError> {
        Ok(self.write()?.handles.insert(handle.clone()))
    }

    async fn remove_handle(&self, handle: &Handle) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        state.seen.remove(handle);
        Ok(state.handles.remove(handle))
    }

    async fn seen_posters(&self, handle: &Handle) -> Result<BTreeSet<PosterId>, StoreError> {
        Ok(self.read()?.seen.get(handle).cloned().unwrap_or_default())
    }

    async fn record_seen(
        &self,
        handle: &Handle,
        posters: &BTreeSet<PosterId>,
    ) -> Result<(), StoreError> {
        self.write()?
            .seen
            .entry(handle.clone())
            .or_default()
            .extend(posters.iter().cloned());
        Ok(())
    }

    async fn subscribers(&self) -> Result<Vec<SubscriberId>, StoreError> {
        Ok(self.read()?.subscribers.iter().copied().collect())
    }

    async fn subscribe(&self, subscriber: SubscriberId) -> Result<bool, StoreError> {
        Ok(self.write()?.subscribers.insert(subscriber))
    }

    async fn status(&self) -> Result<WatchStatus, StoreError> {
        let state = self.read()?;
        Ok(WatchStatus {
            handles: state.handles.len(),
            subscribers: state.subscribers.len(),
            seen_posters: state.seen.values().map(|s| s.len()).sum(),
        })
    }

    async fn save(&self) -> Result<(), StoreError> {
        // Snapshot under the lock, write after releasing it.
        let snapshot = self.read()?.clone();

        let subscribers = snapshot
            .subscribers
            .iter()
            .map(|s| s.0.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        write_atomic(&self.data_dir.join(SUBSCRIBERS_FILE), &subscribers).await?;

        let handles = serde_json::to_string_pretty(&snapshot.handles)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.data_dir.join(HANDLES_FILE), &handles).await?;

        let seen = serde_json::to_string_pretty(&snapshot.seen)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.data_dir.join(SEEN_POSTERS_FILE), &seen).await?;

        tracing::debug!(path = %self.data_dir.display(), "Saved watch state");
        Ok(())
    }
}

async fn read_subscribers(path: &Path) -> BTreeSet<SubscriberId> {
    let Some(raw) = read_record(path).await else {
        return BTreeSet::new();
    };

    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match line.parse::<i64>() {
                Ok(id) => Some(SubscriberId(id)),
                Err(_) => {
                    tracing::warn!(path = %path.display(), line, "Skipping unparseable subscriber");
                    None
                }
            }
        })
        .collect()
}

async fn read_json_record<T: DeserializeOwned + Default>(path: &Path) -> T {
    let Some(raw) = read_record(path).await else {
        return T::default();
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt record, starting empty");
            T::default()
        }
    }
}

async fn read_record(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Some(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable record, starting empty");
            None
        }
    }
}

// Write to a sibling temp file, then rename over the target so readers
// never observe a half-written record.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

//! In-memory watch store for tests and dry runs

use async_trait::async_trait;
use poster_watch_domain::{Handle, PosterId, StoreError, SubscriberId, WatchStatus, WatchStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    subscribers: BTreeSet<SubscriberId>,
    handles: BTreeSet<Handle>,
    seen: BTreeMap<Handle, BTreeSet<PosterId>>,
}

/// Volatile watch store; `save` is a no-op
#[derive(Debug, Default)]
pub struct InMemoryWatchStore {
    inner: RwLock<Inner>,
}

impl InMemoryWatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|e| StoreError::Lock(e.to_string()))
    }
}

#[async_trait]
impl WatchStore for InMemoryWatchStore {
    async fn handles(&self) -> Result<Vec<Handle>, StoreError> {
        Ok(self.read()?.handles.iter().cloned().collect())
    }

    async fn add_handle(&self, handle: &Handle) -> Result<bool, StoreError> {
        Ok(self.write()?.handles.insert(handle.clone()))
    }

    async fn remove_handle(&self, handle: &Handle) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        inner.seen.remove(handle);
        Ok(inner.handles.remove(handle))
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
        let inner = self.read()?;
        Ok(WatchStatus {
            handles: inner.handles.len(),
            subscribers: inner.subscribers.len(),
            seen_posters: inner.seen.values().map(|s| s.len()).sum(),
        })
    }

    async fn save(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

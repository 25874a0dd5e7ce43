//! Watchlist use case - validated mutations of the watched-handle set

use std::sync::Arc;

use crate::{
    model::{Handle, HandleError, SubscriberId, WatchStatus},
    ports::{PageSource, StoreError, WatchStore},
};

/// Errors from watchlist operations
#[derive(Debug, thiserror::Error)]
pub enum WatchlistError {
    #[error(transparent)]
    InvalidHandle(#[from] HandleError),
    #[error("no page found for @{handle} on any mirror")]
    PageNotFound { handle: Handle },
    #[error("State error: {0}")]
    Store(#[from] StoreError),
}

/// Result of adding a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Handle),
    AlreadyMonitored(Handle),
}

/// Result of removing a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Handle),
    NotMonitored(Handle),
}

/// Result of subscribing a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed(SubscriberId),
    AlreadySubscribed(SubscriberId),
}

/// Watchlist management over the store and page source.
///
/// Every mutation persists immediately so command-driven changes survive a
/// crash between check cycles.
pub struct Watchlist<S, P>
where
    S: WatchStore + ?Sized,
    P: PageSource + ?Sized,
{
    store: Arc<S>,
    pages: Arc<P>,
}

impl<S, P> Watchlist<S, P>
where
    S: WatchStore + ?Sized,
    P: PageSource + ?Sized,
{
    pub fn new(store: Arc<S>, pages: Arc<P>) -> Self {
        Self { store, pages }
    }

    /// Validate a raw handle, probe that its page exists, and start
    /// monitoring it. The probe catches typos at add time instead of
    /// leaving a permanently unavailable handle in the watchlist.
    pub async fn add(&self, raw: &str) -> Result<AddOutcome, WatchlistError> {
        let handle = Handle::parse(raw)?;

        if self.store.handles().await?.contains(&handle) {
            return Ok(AddOutcome::AlreadyMonitored(handle));
        }

        if self.pages.fetch_page(&handle).await.is_err() {
            return Err(WatchlistError::PageNotFound { handle });
        }

        self.store.add_handle(&handle).await?;
        self.persist().await;
        tracing::info!(handle = %handle, "Handle added to watchlist");
        Ok(AddOutcome::Added(handle))
    }

    /// Stop monitoring a handle, forgetting its seen posters entirely.
    /// Re-adding it later starts from a clean first check.
    pub async fn remove(&self, raw: &str) -> Result<RemoveOutcome, WatchlistError> {
        let handle = Handle::parse(raw)?;

        if self.store.remove_handle(&handle).await? {
            self.persist().await;
            tracing::info!(handle = %handle, "Handle removed from watchlist");
            Ok(RemoveOutcome::Removed(handle))
        } else {
            Ok(RemoveOutcome::NotMonitored(handle))
        }
    }

    /// All monitored handles
    pub async fn list(&self) -> Result<Vec<Handle>, WatchlistError> {
        Ok(self.store.handles().await?)
    }

    /// Subscribe a chat to alerts
    pub async fn subscribe(
        &self,
        subscriber: SubscriberId,
    ) -> Result<SubscribeOutcome, WatchlistError> {
        if self.store.subscribe(subscriber).await? {
            self.persist().await;
            tracing::info!(subscriber = %subscriber, "Subscriber added");
            Ok(SubscribeOutcome::Subscribed(subscriber))
        } else {
            Ok(SubscribeOutcome::AlreadySubscribed(subscriber))
        }
    }

    /// Aggregate counts of the stored state
    pub async fn status(&self) -> Result<WatchStatus, WatchlistError> {
        Ok(self.store.status().await?)
    }

    // Persistence failures after a successful mutation are logged, not
    // fatal: the next save retries the full state.
    async fn persist(&self) {
        if let Err(e) = self.store.save().await {
            tracing::error!(error = %e, "Failed to save watch state");
        }
    }
}

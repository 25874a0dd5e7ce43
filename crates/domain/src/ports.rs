//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{Handle, PosterId, SubscriberId, WatchStatus};

/// Error type for page fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no mirror returned a page for @{handle}")]
    NotFound { handle: String },
}

/// Port for fetching a handle's page as raw HTML
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page for a handle, trying whatever upstream sources the
    /// adapter knows about. Returns the first document obtained.
    async fn fetch_page(&self, handle: &Handle) -> Result<String, FetchError>;
}

/// Error type for watch store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Port for the durable watch state: monitored handles, subscribers, and
/// the per-handle sets of posters already seen.
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// All monitored handles, in deterministic order
    async fn handles(&self) -> Result<Vec<Handle>, StoreError>;

    /// Start monitoring a handle. Returns false if already monitored.
    async fn add_handle(&self, handle: &Handle) -> Result<bool, StoreError>;

    /// Stop monitoring a handle and drop its seen-poster set.
    /// Returns false if it was not monitored.
    async fn remove_handle(&self, handle: &Handle) -> Result<bool, StoreError>;

    /// Posters already seen for a handle. Empty for unknown handles.
    async fn seen_posters(&self, handle: &Handle) -> Result<BTreeSet<PosterId>, StoreError>;

    /// Merge newly observed posters into a handle's seen set
    async fn record_seen(
        &self,
        handle: &Handle,
        posters: &BTreeSet<PosterId>,
    ) -> Result<(), StoreError>;

    /// All subscribers, in deterministic order
    async fn subscribers(&self) -> Result<Vec<SubscriberId>, StoreError>;

    /// Add a subscriber. Returns false if already subscribed.
    async fn subscribe(&self, subscriber: SubscriberId) -> Result<bool, StoreError>;

    /// Aggregate counts over the stored state
    async fn status(&self) -> Result<WatchStatus, StoreError>;

    /// Flush the current state to durable storage
    async fn save(&self) -> Result<(), StoreError>;
}

/// Error type for alert delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Notifier is disabled")]
    Disabled,
}

/// Port for delivering alert messages to subscribers
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to one subscriber
    async fn send(&self, to: SubscriberId, text: &str) -> Result<(), NotifyError>;

    /// Check if this notifier is enabled
    fn is_enabled(&self) -> bool;
}

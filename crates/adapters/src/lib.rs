//! poster-watch adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `pages`: mirror-rotating page fetcher
//! - `state`: file-backed and in-memory watch stores
//! - `notify`: Telegram alert delivery

mod mirror;
mod state_file;
mod state_memory;
mod telegram;

/// Re-exports for page source adapters
pub mod pages {
    pub use crate::mirror::MirrorClient;
}

/// Re-exports for state adapters
pub mod state {
    pub use crate::state_file::FileWatchStore;
    pub use crate::state_memory::InMemoryWatchStore;
}

/// Re-exports for notifier adapters
pub mod notify {
    pub use crate::telegram::{StubNotifier, TelegramNotifier};
}

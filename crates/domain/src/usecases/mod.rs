//! Application use cases / business logic

pub mod check;
pub mod classify;
pub mod render;
pub mod watchlist;

pub use check::{CheckConfig, CheckCycle, CycleError, CycleOutcome, diff_posters};
pub use classify::PageClassifier;
pub use render::format_alert;
pub use watchlist::{
    AddOutcome, RemoveOutcome, SubscribeOutcome, Watchlist, WatchlistError,
};

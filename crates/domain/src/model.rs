//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{1,15}$").expect("Valid regex"));

/// A watched account handle, normalized to lowercase without the leading `@`.
///
/// Only constructible through [`Handle::parse`], so every `Handle` in the
/// system is already validated and canonical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse and normalize a raw handle: trim whitespace, strip leading `@`,
    /// lowercase, then validate against the platform handle alphabet.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let normalized = raw.trim().trim_start_matches('@').to_lowercase();
        if normalized.is_empty() {
            return Err(HandleError::Empty);
        }
        if !HANDLE_RE.is_match(&normalized) {
            return Err(HandleError::InvalidFormat {
                raw: raw.trim().to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Handle::parse(&value)
    }
}

/// Errors from handle validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("handle is empty after stripping '@' and whitespace")]
    Empty,
    #[error("handle '{raw}' must be 1-15 letters, digits, or underscores")]
    InvalidFormat { raw: String },
}

/// A poster's username as scraped from a page, normalized like [`Handle`]
/// but without the length/alphabet restriction. Scraped names occasionally
/// carry decorations the strict handle rules would reject.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct PosterId(String);

impl PosterId {
    /// Normalize a scraped username. Fails only when nothing is left after
    /// trimming decorations.
    pub fn parse(raw: &str) -> Result<Self, EmptyPosterId> {
        let normalized = raw.trim().trim_start_matches('@').to_lowercase();
        if normalized.is_empty() {
            return Err(EmptyPosterId);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PosterId {
    type Error = EmptyPosterId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PosterId::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("poster name is empty after normalization")]
pub struct EmptyPosterId;

/// A subscriber chat ID on the delivery channel. Negative IDs are group
/// chats, so the full signed range is valid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of page a fetched document represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// A community page, where many accounts post
    Community,
    /// A single user's profile page
    User,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Community => write!(f, "Community"),
            PageKind::User => write!(f, "User"),
        }
    }
}

/// Classified view of one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Page kind detected from the document
    pub kind: PageKind,
    /// Distinct poster usernames extracted from the newest posts
    pub posters: BTreeSet<PosterId>,
}

/// Aggregate counts of the stored watch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WatchStatus {
    /// Monitored handles
    pub handles: usize,
    /// Alert subscribers
    pub subscribers: usize,
    /// Total posters seen across all handles
    pub seen_posters: usize,
}

/// Result of checking a single handle within a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Posters appeared that had never been seen for this handle
    NewPosters {
        kind: PageKind,
        posters: BTreeSet<PosterId>,
    },
    /// Page fetched and classified, nothing new
    NoNewPosters,
    /// No mirror produced the page; handle untouched this cycle
    Unavailable,
}

/// Summary of one completed check cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Per-handle outcomes in check order
    pub outcomes: Vec<(Handle, CheckOutcome)>,
    /// Alert deliveries that succeeded (per subscriber, per handle)
    pub alerts_delivered: usize,
    /// Alert deliveries that failed
    pub alerts_failed: usize,
    /// Whether the end-of-cycle save ran and succeeded
    pub persisted: bool,
}

impl CycleReport {
    /// Handles checked this cycle
    pub fn checked(&self) -> usize {
        self.outcomes.len()
    }

    /// Handles for which no mirror responded
    pub fn unavailable(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CheckOutcome::Unavailable))
            .count()
    }

    /// Handles that produced new posters
    pub fn handles_with_new(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CheckOutcome::NewPosters { .. }))
            .count()
    }

    /// New posters found across all handles
    pub fn new_poster_total(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                CheckOutcome::NewPosters { posters, .. } => posters.len(),
                _ => 0,
            })
            .sum()
    }
}

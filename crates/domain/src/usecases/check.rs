//! Check cycle use case - orchestrates fetching, diffing, and alert fan-out

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use crate::{
    model::{CheckOutcome, CycleReport, Handle, PosterId},
    ports::{Notifier, PageSource, StoreError, WatchStore},
    usecases::{classify::PageClassifier, render::format_alert},
};

/// Configuration for the check cycle
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Newest posts considered per handle per cycle
    pub posts_per_check: usize,
    /// Pause after fanning out one handle's alert, before the next handle
    pub handle_pace: Duration,
    /// Compute and log findings without recording or delivering anything
    pub dry_run: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            posts_per_check: 20,
            handle_pace: Duration::from_secs(1),
            dry_run: false,
        }
    }
}

/// Outcome of requesting one cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The cycle ran to completion
    Completed(CycleReport),
    /// A cycle was already in progress; nothing was done
    SkippedBusy,
}

/// Errors that abort a whole cycle. Per-handle failures never do.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("State error: {0}")]
    Store(#[from] StoreError),
}

/// Posters present now that have never been seen for this handle.
///
/// Pure set difference: idempotent, and posters that disappeared from the
/// page stay in the seen set so they are never reported again.
pub fn diff_posters(
    current: &BTreeSet<PosterId>,
    seen: &BTreeSet<PosterId>,
) -> BTreeSet<PosterId> {
    current.difference(seen).cloned().collect()
}

/// Check cycle orchestrator
pub struct CheckCycle<P, S, N>
where
    P: PageSource + ?Sized,
    S: WatchStore + ?Sized,
    N: Notifier + ?Sized,
{
    pages: Arc<P>,
    store: Arc<S>,
    notifier: Arc<N>,
    classifier: PageClassifier,
    config: CheckConfig,
    // Guards against overlapping cycles when one runs longer than the
    // scheduler interval.
    cycle_gate: Mutex<()>,
}

impl<P, S, N> CheckCycle<P, S, N>
where
    P: PageSource + ?Sized,
    S: WatchStore + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(pages: Arc<P>, store: Arc<S>, notifier: Arc<N>, config: CheckConfig) -> Self {
        Self {
            pages,
            store,
            notifier,
            classifier: PageClassifier::new(),
            config,
            cycle_gate: Mutex::new(()),
        }
    }

    /// Run a single check cycle over all monitored handles.
    ///
    /// Returns [`CycleOutcome::SkippedBusy`] without doing any work when a
    /// previous cycle is still running.
    pub async fn run_once(&self) -> Result<CycleOutcome, CycleError> {
        let Ok(_guard) = self.cycle_gate.try_lock() else {
            tracing::warn!("Previous check cycle still running, skipping this tick");
            return Ok(CycleOutcome::SkippedBusy);
        };

        let handles = self.store.handles().await?;
        let mut report = CycleReport::default();

        if handles.is_empty() {
            tracing::debug!("No handles to monitor");
            return Ok(CycleOutcome::Completed(report));
        }

        tracing::info!(handles = handles.len(), "Starting check cycle");

        for handle in &handles {
            match self.check_handle(handle, &mut report).await {
                Ok(outcome) => report.outcomes.push((handle.clone(), outcome)),
                Err(e) => {
                    tracing::error!(handle = %handle, error = %e, "Failed to check handle");
                    report.outcomes.push((handle.clone(), CheckOutcome::Unavailable));
                    // Continue with other handles
                }
            }
        }

        if self.config.dry_run {
            tracing::info!("[DRY RUN] Skipping state save");
        } else {
            match self.store.save().await {
                Ok(()) => report.persisted = true,
                Err(e) => tracing::error!(error = %e, "Failed to save watch state"),
            }
        }

        tracing::info!(
            checked = report.checked(),
            new_posters = report.new_poster_total(),
            unavailable = report.unavailable(),
            "Check cycle complete"
        );

        Ok(CycleOutcome::Completed(report))
    }

    /// Check one handle: fetch its page, diff posters against the seen set,
    /// and fan the alert out. Fetch failures skip the handle untouched.
    async fn check_handle(
        &self,
        handle: &Handle,
        report: &mut CycleReport,
    ) -> Result<CheckOutcome, StoreError> {
        let content = match self.pages.fetch_page(handle).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "Page unavailable, skipping");
                return Ok(CheckOutcome::Unavailable);
            }
        };

        let snapshot = self.classifier.classify(&content, self.config.posts_per_check);
        let seen = self.store.seen_posters(handle).await?;
        let new_posters = diff_posters(&snapshot.posters, &seen);

        if new_posters.is_empty() {
            tracing::debug!(handle = %handle, "No new posters");
            return Ok(CheckOutcome::NoNewPosters);
        }

        tracing::info!(
            handle = %handle,
            kind = %snapshot.kind,
            new_posters = new_posters.len(),
            "Found new posters"
        );

        let alert = format_alert(handle, snapshot.kind, &new_posters);

        if self.config.dry_run {
            tracing::info!(handle = %handle, alert = %alert, "[DRY RUN] Would alert subscribers");
            return Ok(CheckOutcome::NewPosters {
                kind: snapshot.kind,
                posters: new_posters,
            });
        }

        // Mark seen before delivery. A crash mid-fan-out may drop an alert
        // but never repeats one.
        self.store.record_seen(handle, &new_posters).await?;

        self.fan_out(handle, &alert, report).await?;

        if !self.config.handle_pace.is_zero() {
            sleep(self.config.handle_pace).await;
        }

        Ok(CheckOutcome::NewPosters {
            kind: snapshot.kind,
            posters: new_posters,
        })
    }

    /// Deliver one alert to every subscriber. Failures are counted and
    /// logged per subscriber; the rest of the fan-out continues.
    async fn fan_out(
        &self,
        handle: &Handle,
        alert: &str,
        report: &mut CycleReport,
    ) -> Result<(), StoreError> {
        if !self.notifier.is_enabled() {
            tracing::debug!(handle = %handle, "Notifier disabled, skipping delivery");
            return Ok(());
        }

        let subscribers = self.store.subscribers().await?;

        if subscribers.is_empty() {
            tracing::debug!(handle = %handle, "No subscribers to alert");
            return Ok(());
        }

        for subscriber in subscribers {
            match self.notifier.send(subscriber, alert).await {
                Ok(()) => report.alerts_delivered += 1,
                Err(e) => {
                    report.alerts_failed += 1;
                    tracing::error!(
                        subscriber = %subscriber,
                        error = %e,
                        "Failed to deliver alert"
                    );
                }
            }
        }

        Ok(())
    }
}

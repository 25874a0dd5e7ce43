//! Run command - scheduled check cycles with alert fan-out

use anyhow::{Context, Result, bail};
use poster_watch_adapters::{
    notify::TelegramNotifier, pages::MirrorClient, state::FileWatchStore,
};
use poster_watch_domain::usecases::{CheckConfig, CheckCycle, CycleOutcome};
use poster_watch_domain::{SubscriberId, WatchStore};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::args::RunArgs;
use crate::config::AppConfig;

type WatchCycle = CheckCycle<MirrorClient, FileWatchStore, TelegramNotifier>;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let dry_run = args.dry_run;

    if config.mirrors.urls.is_empty() {
        bail!("No mirrors configured");
    }

    tracing::info!(
        dry_run = dry_run,
        once = args.once,
        data_dir = %config.general.data_dir.display(),
        mirrors = config.mirrors.urls.len(),
        "Starting poster-watch run"
    );

    // Build dependencies
    let store = Arc::new(open_store(&config).await?);
    let pages = Arc::new(build_mirror_client(&config));
    let notifier = Arc::new(build_notifier(&config, dry_run)?);

    subscribe_default_chat(&config, store.as_ref()).await?;

    let check_config = CheckConfig {
        posts_per_check: config.watch.posts_per_check,
        handle_pace: Duration::from_secs(config.watch.handle_pace_secs),
        dry_run,
    };

    let cycle = CheckCycle::new(pages, store, notifier, check_config);

    // Execute
    if args.once {
        tracing::info!("Running single check cycle");
        match cycle.run_once().await? {
            CycleOutcome::Completed(report) => {
                tracing::info!(
                    checked = report.checked(),
                    unavailable = report.unavailable(),
                    new_posters = report.new_poster_total(),
                    alerts_delivered = report.alerts_delivered,
                    alerts_failed = report.alerts_failed,
                    "Check cycle complete"
                );
            }
            CycleOutcome::SkippedBusy => {}
        }
    } else {
        let period = Duration::from_secs(config.watch.check_interval_secs);
        let warmup = Duration::from_secs(config.watch.warmup_secs);
        let mut ticker = interval_at(Instant::now() + warmup, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Set up graceful shutdown
        let shutdown = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Shutdown signal received");
        };

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => run_cycle(&cycle).await,
                _ = &mut shutdown => {
                    tracing::info!("Shutting down gracefully");
                    break;
                }
            }
        }
    }

    tracing::info!("poster-watch run completed");
    Ok(())
}

async fn run_cycle(cycle: &WatchCycle) {
    match cycle.run_once().await {
        Ok(CycleOutcome::Completed(report)) => {
            if report.checked() > 0 {
                tracing::info!(
                    checked = report.checked(),
                    unavailable = report.unavailable(),
                    new_posters = report.new_poster_total(),
                    alerts_delivered = report.alerts_delivered,
                    alerts_failed = report.alerts_failed,
                    "Check cycle complete"
                );
            }
        }
        Ok(CycleOutcome::SkippedBusy) => {}
        Err(e) => {
            tracing::error!(error = %e, "Check cycle failed");
        }
    }
}

pub(crate) async fn open_store(config: &AppConfig) -> Result<FileWatchStore> {
    FileWatchStore::load(&config.general.data_dir)
        .await
        .context("Failed to open watch state")
}

pub(crate) fn build_mirror_client(config: &AppConfig) -> MirrorClient {
    MirrorClient::with_timing(
        config.mirrors.urls.clone(),
        Duration::from_secs(config.mirrors.attempt_timeout_secs),
        Duration::from_secs(config.mirrors.attempt_pace_secs),
    )
}

fn build_notifier(config: &AppConfig, dry_run: bool) -> Result<TelegramNotifier> {
    if dry_run {
        return Ok(TelegramNotifier::disabled());
    }

    let bot_token = load_bot_token(&config.telegram.bot_token_env)?;
    Ok(TelegramNotifier::new(bot_token))
}

fn load_bot_token(env_var: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No bot token env var configured");
    }

    let token = std::env::var(env_var)
        .with_context(|| format!("Missing bot token env var {}", env_var))?;

    if token.trim().is_empty() {
        bail!("Bot token env var {} is empty", env_var);
    }

    Ok(SecretString::new(token.into()))
}

async fn subscribe_default_chat(config: &AppConfig, store: &FileWatchStore) -> Result<()> {
    if config.telegram.default_chat_id == 0 {
        return Ok(());
    }

    let chat = SubscriberId(config.telegram.default_chat_id);
    if store.subscribe(chat).await? {
        store.save().await?;
        tracing::info!(chat_id = %chat, "Default chat subscribed");
    }

    Ok(())
}

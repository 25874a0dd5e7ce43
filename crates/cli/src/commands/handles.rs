//! Handles command - manage the monitored watchlist

use anyhow::Result;
use poster_watch_domain::usecases::{AddOutcome, RemoveOutcome, Watchlist};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{HandlesArgs, HandlesCommands};
use crate::commands::run::{build_mirror_client, open_store};
use crate::config::AppConfig;

pub async fn execute(args: HandlesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = Arc::new(open_store(&config).await?);
    let pages = Arc::new(build_mirror_client(&config));
    let watchlist = Watchlist::new(store, pages);

    match args.command {
        HandlesCommands::Add { handle } => match watchlist.add(&handle).await? {
            AddOutcome::Added(handle) => println!("Monitoring @{}", handle),
            AddOutcome::AlreadyMonitored(handle) => {
                println!("@{} is already monitored", handle);
            }
        },
        HandlesCommands::Remove { handle } => match watchlist.remove(&handle).await? {
            RemoveOutcome::Removed(handle) => println!("Stopped monitoring @{}", handle),
            RemoveOutcome::NotMonitored(handle) => println!("@{} is not monitored", handle),
        },
        HandlesCommands::List { json } => {
            let handles = watchlist.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&handles)?);
            } else if handles.is_empty() {
                println!("No handles monitored");
            } else {
                for handle in handles {
                    println!("@{}", handle);
                }
            }
        }
    }

    Ok(())
}

//! Status command - show watch state counts

use anyhow::Result;
use poster_watch_domain::usecases::Watchlist;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::StatusArgs;
use crate::commands::run::{build_mirror_client, open_store};
use crate::config::AppConfig;

pub async fn execute(args: StatusArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = Arc::new(open_store(&config).await?);
    let pages = Arc::new(build_mirror_client(&config));
    let watchlist = Watchlist::new(store, pages);

    let status = watchlist.status().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Monitored handles: {}", status.handles);
        println!("Subscribers:       {}", status.subscribers);
        println!("Seen posters:      {}", status.seen_posters);
    }

    Ok(())
}

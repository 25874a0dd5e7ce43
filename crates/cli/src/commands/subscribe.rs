//! Subscribe command - register a chat id for alerts

use anyhow::Result;
use poster_watch_domain::SubscriberId;
use poster_watch_domain::usecases::{SubscribeOutcome, Watchlist};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::SubscribeArgs;
use crate::commands::run::{build_mirror_client, open_store};
use crate::config::AppConfig;

pub async fn execute(args: SubscribeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = Arc::new(open_store(&config).await?);
    let pages = Arc::new(build_mirror_client(&config));
    let watchlist = Watchlist::new(store, pages);

    match watchlist.subscribe(SubscriberId(args.chat_id)).await? {
        SubscribeOutcome::Subscribed(chat) => println!("Subscribed chat {}", chat),
        SubscribeOutcome::AlreadySubscribed(chat) => {
            println!("Chat {} is already subscribed", chat);
        }
    }

    Ok(())
}

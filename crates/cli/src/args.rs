//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// poster-watch: watch social pages and alert subscribers about new posters
#[derive(Parser, Debug)]
#[command(name = "poster-watch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check monitored handles on an interval and alert subscribers
    Run(RunArgs),

    /// Manage the monitored handle watchlist
    Handles(HandlesArgs),

    /// Subscribe a chat id to new-poster alerts
    Subscribe(SubscribeArgs),

    /// Show watch state counts
    Status(StatusArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run in dry-run mode (no alerts delivered, no state recorded)
    #[arg(long)]
    pub dry_run: bool,

    /// Process one check cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct HandlesArgs {
    #[command(subcommand)]
    pub command: HandlesCommands,
}

#[derive(Subcommand, Debug)]
pub enum HandlesCommands {
    /// Start monitoring a handle (probes that its page loads first)
    Add {
        /// Handle to monitor, with or without a leading @
        handle: String,
    },

    /// Stop monitoring a handle and forget its seen posters
    Remove {
        /// Handle to stop monitoring
        handle: String,
    },

    /// List monitored handles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Chat id to receive alerts (negative for group chats)
    #[arg(allow_hyphen_values = true)]
    pub chat_id: i64,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

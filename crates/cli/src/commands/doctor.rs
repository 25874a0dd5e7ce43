//! Doctor command - validate configuration and show status

use anyhow::Result;
use poster_watch_adapters::state::FileWatchStore;
use poster_watch_domain::WatchStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    data_dir: CheckResult,
    mirrors: CheckResult,
    telegram: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        data_dir: CheckResult::error("Not checked"),
        mirrors: CheckResult::error("Not checked"),
        telegram: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.data_dir = check_data_dir(&config.general.data_dir).await;
        report.mirrors = check_mirrors(config);
        report.telegram = check_telegram(config);
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.data_dir,
        &report.mirrors,
        &report.telegram,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_data_dir(dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warn(format!(
            "Data directory does not exist yet: {} (created on first run)",
            dir.display()
        ));
    }

    let store = match FileWatchStore::load(dir).await {
        Ok(s) => s,
        Err(e) => {
            return CheckResult::error(format!("Failed to open watch state: {}", e));
        }
    };

    match store.status().await {
        Ok(status) => CheckResult::ok(format!(
            "{} handles, {} subscribers, {} seen posters",
            status.handles, status.subscribers, status.seen_posters
        ))
        .with_details(serde_json::json!({
            "handles": status.handles,
            "subscribers": status.subscribers,
            "seen_posters": status.seen_posters,
        })),
        Err(e) => CheckResult::error(format!("Failed to read watch state: {}", e)),
    }
}

fn check_mirrors(config: &AppConfig) -> CheckResult {
    let urls = &config.mirrors.urls;

    if urls.is_empty() {
        return CheckResult::error("No mirrors configured");
    }

    CheckResult::ok(format!("{} mirrors configured", urls.len()))
        .with_details(serde_json::json!(urls))
}

fn check_telegram(config: &AppConfig) -> CheckResult {
    let env_var = &config.telegram.bot_token_env;

    if env_var.is_empty() {
        return CheckResult::error("No bot token env var configured");
    }

    let default_chat = if config.telegram.default_chat_id != 0 {
        format!(", Default chat: {}", config.telegram.default_chat_id)
    } else {
        String::new()
    };

    match std::env::var(env_var) {
        Ok(val) if !val.is_empty() => CheckResult::ok(format!(
            "Bot token: {} (set){}",
            env_var, default_chat
        )),
        _ => CheckResult::warn(format!(
            "Bot token: {} (not set){}",
            env_var, default_chat
        )),
    }
}

fn print_report(report: &DoctorReport) {
    println!("poster-watch Doctor Report");
    println!("==========================");
    println!();

    print_check("Config", &report.config);
    print_check("Data Dir", &report.data_dir);
    print_check("Mirrors", &report.mirrors);
    print_check("Telegram", &report.telegram);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: poster-watch run --dry-run --once");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}

//! Telegram Bot API notifier for delivering alerts

use async_trait::async_trait;
use poster_watch_domain::{Notifier, NotifyError, SubscriberId};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// Notifier that delivers alerts through a Telegram bot
pub struct TelegramNotifier {
    client: Client,
    bot_token: SecretString,
    base_url: String,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn new(bot_token: SecretString) -> Self {
        Self::with_base_url(bot_token, "https://api.telegram.org".to_string(), true)
    }

    pub fn with_base_url(bot_token: SecretString, base_url: String, enabled: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            bot_token,
            base_url,
            enabled,
        }
    }

    /// Create a disabled notifier (for testing/dry-run)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            bot_token: SecretString::new("".into()),
            base_url: String::new(),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
    parse_mode: String,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, to: SubscriberId, text: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }

        let request = SendMessageRequest {
            chat_id: to.0,
            text: text.to_string(),
            parse_mode: "HTML".to_string(),
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.base_url,
            self.bot_token.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if response.status() == 401 {
            return Err(NotifyError::Auth("Invalid bot token".to_string()));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api(format!(
                "Failed to send message: {}",
                body
            )));
        }

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Stub notifier for testing
pub struct StubNotifier {
    enabled: bool,
    sent: std::sync::Mutex<Vec<(SubscriberId, String)>>,
}

impl StubNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sent: std::sync::Mutex::new(vec![]),
        }
    }

    /// Get all messages that were sent
    pub fn get_sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, to: SubscriberId, text: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }

        self.sent.lock().unwrap().push((to, text.to_string()));
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

//! Telegram Bot API notifier

use async_trait::async_trait;
use std::time::Duration;

use super::{Notifier, NotifyError};

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Sends messages through `sendMessage`
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        Self::with_api_url(DEFAULT_API_URL, token, timeout)
    }

    pub fn with_api_url(
        api_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.token
        );
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        // The URL embeds the token; keep it out of error messages
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(format!("Failed to send message: {}", e.without_url())))?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();

        if !status.is_success() || body.get("ok") != Some(&serde_json::Value::Bool(true)) {
            let description = body
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("no description");
            return Err(NotifyError::Rejected(format!("{}: {}", status, description)));
        }

        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }
}

//! Chat notification delivery
//!
//! Delivery is best effort: callers log failures and move on.

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;

/// Sends a text message to a chat
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

/// Notifier that only writes messages to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        tracing::info!(chat_id, "Notification: {}", text);
        Ok(())
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Message rejected: {0}")]
    Rejected(String),
}

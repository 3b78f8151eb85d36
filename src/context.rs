//! Handles to the external collaborators, built once and passed to each sweeper

use std::sync::Arc;

use crate::config::AlertPolicy;
use crate::lookup::FlightLookup;
use crate::notify::Notifier;
use crate::store::AlertStore;

#[derive(Clone)]
pub struct AlertContext {
    pub store: Arc<dyn AlertStore>,
    pub lookup: Arc<dyn FlightLookup>,
    pub notifier: Arc<dyn Notifier>,
    pub policy: AlertPolicy,
}

impl AlertContext {
    pub fn new(
        store: Arc<dyn AlertStore>,
        lookup: Arc<dyn FlightLookup>,
        notifier: Arc<dyn Notifier>,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            store,
            lookup,
            notifier,
            policy,
        }
    }

    /// Best-effort delivery; failures are logged, never retried
    pub async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.notifier.send(chat_id, text).await {
            tracing::error!(chat_id, error = %e, "Failed to send notification");
        }
    }
}

//! Follow-up chat over an analysed bill.

use super::call_model;
use crate::config::Config;
use crate::model::GenerativeModel;
use crate::session::SessionStore;
use crate::telemetry::Telemetry;
use crate::{Error, Result};

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Answers chat messages within a user's bill session.
pub struct ChatReplyService {
    model: Arc<dyn GenerativeModel>,
    sessions: Arc<dyn SessionStore>,
    telemetry: Arc<Telemetry>,
    timeout: Duration,
}

impl ChatReplyService {
    /// Create a chat service with the default timeout.
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        sessions: Arc<dyn SessionStore>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            model,
            sessions,
            telemetry,
            timeout: Config::default().model.timeout(),
        }
    }

    /// Apply the model timeout from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.timeout = config.model.timeout();
        self
    }

    /// Set the per-call model timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reply to `message` in the session owned by `user_id`.
    ///
    /// # Returns
    /// * `Ok(String)` - The model's reply
    /// * `Err(Error::SessionNotFound)` - If the user has not uploaded a bill
    /// * `Err(Error)` - If the model call fails or times out
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn reply(&self, user_id: &str, message: &str) -> Result<String> {
        let outcome = self.reply_inner(user_id, message).await;

        match &outcome {
            Ok(reply) => {
                self.telemetry.record_chat(true);
                tracing::info!(reply_len = reply.len(), "Chat reply sent");
            }
            Err(e) => {
                self.telemetry.record_chat(false);
                self.telemetry.record_error(e.category());
                tracing::warn!(error = %e, recoverable = e.is_recoverable(), "Chat reply failed");
            }
        }

        outcome
    }

    async fn reply_inner(&self, user_id: &str, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(Error::validation_field("message is empty", "message"));
        }

        let session = self
            .sessions
            .get_session(user_id)
            .ok_or_else(|| Error::session_not_found(user_id))?;

        // The timeout covers the model call only, not queueing for the lock.
        let mut guard = session.lock().await;
        let reply = call_model(
            &self.telemetry,
            self.timeout,
            "chat reply",
            self.model.send_message(&guard.history, message),
        )
        .await?;
        guard.record_exchange(message, &reply);

        Ok(reply)
    }
}

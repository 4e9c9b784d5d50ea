//! Per-user chat sessions.
//!
//! Each user has at most one session; starting a new one replaces the old.
//! Sessions live in memory for the lifetime of the process, with no eviction.

mod store;

pub use store::{InMemorySessionStore, SessionStore};

use crate::model::{ChatTurn, GenerativeModel, PromptPart, Role};
use crate::Result;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Model turn appended after the seed context so the history alternates.
pub const SEED_ACKNOWLEDGEMENT: &str =
    "I've reviewed your electricity bill and carbon budget. What would you like to know?";

/// Conversation state for one user.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Unique session identifier
    pub session_id: String,
    /// Owning user
    pub user_id: String,
    /// All turns so far, seed context first
    pub history: Vec<ChatTurn>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the last exchange was recorded
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session seeded with `initial_context` as the first user turn.
    pub fn new(user_id: impl Into<String>, initial_context: Vec<PromptPart>) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            history: vec![
                ChatTurn::new(Role::User, initial_context),
                ChatTurn::model_text(SEED_ACKNOWLEDGEMENT),
            ],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user message and the model's reply.
    pub fn record_exchange(&mut self, message: &str, reply: &str) {
        self.history.push(ChatTurn::user_text(message));
        self.history.push(ChatTurn::model_text(reply));
        self.updated_at = Utc::now();
    }
}

/// Shared handle to a user's session.
///
/// The session sits behind an async mutex: messages for the same user are
/// processed one at a time, while other users are never blocked.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: String,
    user_id: String,
    inner: Arc<Mutex<ChatSession>>,
}

impl SessionHandle {
    /// Wrap a session.
    pub fn new(session: ChatSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// The session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The owning user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Snapshot of the history.
    pub async fn history(&self) -> Vec<ChatTurn> {
        self.inner.lock().await.history.clone()
    }

    /// Number of turns recorded.
    pub async fn turn_count(&self) -> usize {
        self.inner.lock().await.history.len()
    }

    /// Wait for exclusive access to the session.
    ///
    /// Holding the guard keeps other messages for this user queued.
    pub async fn lock(&self) -> MutexGuard<'_, ChatSession> {
        self.inner.lock().await
    }

    /// Send `message` to the model within this session and record the exchange.
    ///
    /// History is only extended when the model call succeeds.
    pub async fn send_message(&self, model: &dyn GenerativeModel, message: &str) -> Result<String> {
        let mut session = self.lock().await;
        let reply = model.send_message(&session.history, message).await?;
        session.record_exchange(message, &reply);
        Ok(reply)
    }

    /// Whether two handles point at the same session.
    pub fn same_session(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;

    struct EchoModel;

    #[async_trait]
    impl GenerativeModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_content(&self, _parts: &[PromptPart]) -> Result<String> {
            Ok(String::new())
        }

        async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<String> {
            Ok(format!("{} after {} turns", message, history.len()))
        }
    }

    struct DownModel;

    #[async_trait]
    impl GenerativeModel for DownModel {
        fn name(&self) -> &str {
            "down"
        }

        async fn generate_content(&self, _parts: &[PromptPart]) -> Result<String> {
            Err(Error::integration("test", "down"))
        }

        async fn send_message(&self, _history: &[ChatTurn], _message: &str) -> Result<String> {
            Err(Error::integration("test", "down"))
        }
    }

    #[test]
    fn test_new_session_is_seeded() {
        let session = ChatSession::new("alice", vec![PromptPart::text("bill summary")]);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[0].text(), "bill summary");
        assert_eq!(session.history[1].role, Role::Model);
    }

    #[tokio::test]
    async fn test_send_message_records_exchange() {
        let handle = SessionHandle::new(ChatSession::new("alice", vec![PromptPart::text("ctx")]));

        let reply = handle.send_message(&EchoModel, "hello").await.unwrap();
        assert_eq!(reply, "hello after 2 turns");

        let history = handle.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[2].text(), "hello");
        assert_eq!(history[3].text(), "hello after 2 turns");
    }

    #[tokio::test]
    async fn test_failed_send_keeps_history() {
        let handle = SessionHandle::new(ChatSession::new("alice", vec![PromptPart::text("ctx")]));

        assert!(handle.send_message(&DownModel, "hello").await.is_err());
        assert_eq!(handle.turn_count().await, 2);
    }
}

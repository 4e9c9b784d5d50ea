//! Session store abstraction and the in-memory implementation.

use super::{ChatSession, SessionHandle};
use crate::model::PromptPart;

use dashmap::DashMap;

/// Keyed storage of chat sessions, one per user.
pub trait SessionStore: Send + Sync {
    /// Create the session for `user_id`, replacing any existing one.
    fn start_session(&self, user_id: &str, initial_context: Vec<PromptPart>) -> SessionHandle;

    /// Look up the session for `user_id`.
    fn get_session(&self, user_id: &str) -> Option<SessionHandle>;

    /// Drop the session for `user_id`. Returns whether one existed.
    fn remove_session(&self, user_id: &str) -> bool;

    /// Number of live sessions.
    fn len(&self) -> usize;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime session store backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionHandle>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn start_session(&self, user_id: &str, initial_context: Vec<PromptPart>) -> SessionHandle {
        let handle = SessionHandle::new(ChatSession::new(user_id, initial_context));
        if let Some(previous) = self.sessions.insert(user_id.to_string(), handle.clone()) {
            tracing::info!(
                user_id,
                replaced = previous.session_id(),
                session_id = handle.session_id(),
                "Replaced chat session"
            );
        } else {
            tracing::info!(user_id, session_id = handle.session_id(), "Started chat session");
        }
        handle
    }

    fn get_session(&self, user_id: &str) -> Option<SessionHandle> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    fn remove_session(&self, user_id: &str) -> bool {
        self.sessions.remove(user_id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

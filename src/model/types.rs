//! Prompt and conversation types shared by every model provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of a prompt: text or an attached file.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptPart {
    /// Plain text
    Text {
        /// The text content
        text: String,
    },
    /// Binary payload such as a bill image or PDF
    File {
        /// MIME type of the payload
        mime_type: String,
        /// Raw bytes
        #[serde(skip)]
        data: Vec<u8>,
    },
}

impl PromptPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        PromptPart::Text { text: text.into() }
    }

    /// Create a file part.
    pub fn file(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        PromptPart::File {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// The text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PromptPart::Text { text } => Some(text),
            PromptPart::File { .. } => None,
        }
    }
}

impl std::fmt::Debug for PromptPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptPart::Text { text } => f.debug_tuple("Text").field(text).finish(),
            PromptPart::File { mime_type, data } => f
                .debug_struct("File")
                .field("mime_type", mime_type)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (or the service speaking on their behalf)
    User,
    /// The model
    Model,
}

/// A single turn in a chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Author of the turn
    pub role: Role,
    /// Turn content
    pub parts: Vec<PromptPart>,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a turn with arbitrary parts.
    pub fn new(role: Role, parts: Vec<PromptPart>) -> Self {
        Self {
            role,
            parts,
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![PromptPart::text(text)])
    }

    /// Create a model turn holding a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![PromptPart::text(text)])
    }

    /// All text parts joined with newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(PromptPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

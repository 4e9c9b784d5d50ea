//! External generative model capability.
//!
//! The rest of the crate only sees the [`GenerativeModel`] trait: "given a
//! prompt and a file, return text" plus multi-turn chat over a history.
//! [`GeminiClient`] is the production implementation.

mod client;
mod gemini;
mod types;

pub use client::{ProviderClient, ProviderResult};
pub use gemini::GeminiClient;
pub use types::{ChatTurn, PromptPart, Role};

use crate::Result;
use async_trait::async_trait;

/// A hosted multimodal language model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs and health output.
    fn name(&self) -> &str;

    /// Single-shot generation from text and file parts.
    async fn generate_content(&self, parts: &[PromptPart]) -> Result<String>;

    /// Continue a conversation: `history` is everything so far, `message`
    /// the new user turn. Returns the model's reply text.
    async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<String>;
}

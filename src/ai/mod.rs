//! Text and menu generation through an external chat-completion endpoint.

pub mod client;
pub mod letters;
pub mod menu;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::HttpCompletionClient;
pub use menu::{parse_portions, GeneratedMenu};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI completion service is not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service answered with status {0}")]
    Status(u16),

    #[error("AI response did not match the expected format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// A chat-completion backend. Returns the assistant's message text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String, AiError>;
}

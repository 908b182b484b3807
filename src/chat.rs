//! Conversation types and the request-normalization boundary.
//!
//! Callers deliver either a full ordered message history or a single
//! free-form `query` field; both shapes normalize to a [`ChatTurn`].

use crate::error::{Result, RaadError};
use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in an ordered conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling settings supplied by the caller alongside the history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSettings {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Wire shape of a chat request.
///
/// Some deployments send `{chatSettings, messages}`, others deliver the
/// subject text as a single `query`/`userInput` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, alias = "chatSettings")]
    pub settings: Option<RequestSettings>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, alias = "userInput")]
    pub query: Option<String>,
}

/// A normalized chat turn ready for the pipeline.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Normalize the wire shape into a [`ChatTurn`].
    ///
    /// An explicit message history wins over `query`; a `query`-only request
    /// becomes a single user message. A request carrying neither is invalid.
    pub fn normalize(self, default_model: &str, default_temperature: f32) -> Result<ChatTurn> {
        let settings = self.settings.unwrap_or_default();

        let messages = if !self.messages.is_empty() {
            self.messages
        } else {
            match self.query.as_deref().map(str::trim) {
                Some(query) if !query.is_empty() => vec![ChatMessage::user(query)],
                _ => {
                    return Err(RaadError::InvalidInput(
                        "Request must contain 'messages' or a non-empty 'query'".to_string(),
                    ))
                }
            }
        };

        Ok(ChatTurn {
            model: settings
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_model.to_string()),
            temperature: settings.temperature.unwrap_or(default_temperature),
            messages,
        })
    }
}

/// Extract the most recent user-authored message content.
///
/// Scans from the end of the history backward and stops at the first
/// `user`-role message; returns the empty string when none exists.
pub fn last_user_message(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

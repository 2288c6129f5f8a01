use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("user"),
            MessageRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// A persisted conversation turn. `id` and `timestamp` are assigned by the
/// message store; messages for a user are totally ordered by `timestamp` and
/// immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A turn that has not been persisted yet (no id, no timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl NewMessage {
    pub fn user(content: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            user_id: user_id.into(),
        }
    }

    pub fn assistant(content: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            user_id: user_id.into(),
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use domain::{ChatMessage, NewMessage};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Transport failure, classified into permanent (terminal for the session)
/// and transient (worth retrying) classes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("service unavailable")]
    Unavailable,

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl StoreError {
    /// Permanent errors are never retried; the session reports them and
    /// stops.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StoreError::PermissionDenied | StoreError::Unavailable)
    }

    pub(crate) fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => StoreError::PermissionDenied,
            503 => StoreError::Unavailable,
            other => StoreError::Status(other),
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StoreError::Timeout
        } else if error.is_connect() {
            StoreError::Network(error.to_string())
        } else {
            StoreError::Decode(error.to_string())
        }
    }
}

/// Document collection holding conversation turns. The store assigns ids and
/// monotonically increasing timestamps; `list` returns messages in store
/// order (timestamp ascending) and callers never re-sort.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: NewMessage) -> Result<ChatMessage, StoreError>;

    async fn list(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// In-process store used by tests and offline demo mode. Timestamps are
/// strictly increasing even when appends land within the same clock tick.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    messages: Vec<ChatMessage>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Decode("store lock poisoned".to_string()))?;

        let now = Utc::now();
        let timestamp = match inner.last_timestamp {
            Some(last) if now <= last => last + ChronoDuration::milliseconds(1),
            _ => now,
        };
        inner.last_timestamp = Some(timestamp);

        let stored = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: message.role,
            content: message.content,
            user_id: message.user_id,
            timestamp,
        };
        inner.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Decode("store lock poisoned".to_string()))?;

        Ok(inner
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Decode("store lock poisoned".to_string()))?;

        inner.messages.retain(|m| m.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timestamps_are_strictly_increasing() {
        let store = MemoryMessageStore::new();
        for i in 0..5 {
            store
                .append(NewMessage::user(format!("m{i}"), "uid-1"))
                .await
                .expect("append succeeds");
        }

        let messages = store.list("uid-1").await.expect("list succeeds");
        assert_eq!(messages.len(), 5);
        for pair in messages.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let store = MemoryMessageStore::new();
        store
            .append(NewMessage::user("mine", "uid-1"))
            .await
            .expect("append succeeds");
        store
            .append(NewMessage::user("theirs", "uid-2"))
            .await
            .expect("append succeeds");

        let mine = store.list("uid-1").await.expect("list succeeds");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].content, "mine");
    }

    #[test]
    fn permanence_classification() {
        assert!(StoreError::PermissionDenied.is_permanent());
        assert!(StoreError::Unavailable.is_permanent());
        assert!(!StoreError::Timeout.is_permanent());
        assert!(!StoreError::Network("reset".to_string()).is_permanent());
        assert!(!StoreError::Status(500).is_permanent());

        assert_eq!(StoreError::from_status(403), StoreError::PermissionDenied);
        assert_eq!(StoreError::from_status(503), StoreError::Unavailable);
        assert_eq!(StoreError::from_status(500), StoreError::Status(500));
    }
}

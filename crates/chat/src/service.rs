//! The send pipeline: persist the user turn, generate a reply, persist the
//! assistant turn. Each write goes through the bounded retry engine; an
//! unsaved user turn aborts the send so no orphan assistant turn appears.

use crate::retry::{run_with_retry, RetryPolicy};
use crate::store::{MessageStore, StoreError};
use domain::{ChatMessage, NewMessage};
use futures::future::join_all;
use llm::{fallback, ResponseGenerator};
use std::sync::Arc;
use tracing::{info, warn};

pub const SEND_FAILED_NOTICE: &str =
    "Failed to send message. Please check your internet connection and try again.";
pub const REPLY_NOT_SAVED_NOTICE: &str =
    "Failed to save the response. Please check your connection.";
pub const CLEARED_NOTICE: &str = "Chat history cleared";
pub const CLEAR_FAILED_NOTICE: &str = "Failed to clear chat history";

/// Result of one send, including the single user-visible notice for any
/// failure leg. The caller renders these; nothing here is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Both turns persisted.
    Delivered { reply: String },
    /// The user turn never persisted; the assistant turn was skipped.
    NotSent { notice: String },
    /// The user turn persisted and a reply was generated, but the assistant
    /// turn could not be saved. The user turn is not rolled back.
    ReplyNotSaved { reply: String, notice: String },
}

pub struct ChatService {
    store: Arc<dyn MessageStore>,
    generator: Arc<dyn ResponseGenerator>,
    policy: RetryPolicy,
}

impl ChatService {
    pub fn new(store: Arc<dyn MessageStore>, generator: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            store,
            generator,
            policy: RetryPolicy::append(),
        }
    }

    /// Overrides the write retry policy. Used by tests to shrink delays.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persists the user turn, generates the assistant reply, persists it.
    pub async fn send(&self, user_id: &str, content: &str) -> SendOutcome {
        let user_turn = NewMessage::user(content, user_id);
        let appended = match self.append_with_retry(user_turn).await {
            Ok(message) => message,
            Err(e) => {
                warn!("user turn never persisted ({e}), skipping assistant turn");
                return SendOutcome::NotSent {
                    notice: SEND_FAILED_NOTICE.to_string(),
                };
            }
        };

        let history = match self.store.list(user_id).await {
            Ok(history) => history,
            // The reply can still be generated from the turn we just wrote.
            Err(e) => {
                warn!("history read failed ({e}), generating from the last turn only");
                vec![appended]
            }
        };

        let reply = match self.generator.generate(&history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("generator failed ({e}), serving the canned apology");
                fallback::TECHNICAL_DIFFICULTIES.to_string()
            }
        };

        let assistant_turn = NewMessage::assistant(reply.clone(), user_id);
        match self.append_with_retry(assistant_turn).await {
            Ok(_) => {
                info!("conversation turn delivered for {user_id}");
                SendOutcome::Delivered { reply }
            }
            Err(e) => {
                warn!("assistant turn never persisted: {e}");
                SendOutcome::ReplyNotSaved {
                    reply,
                    notice: REPLY_NOT_SAVED_NOTICE.to_string(),
                }
            }
        }
    }

    /// Deletes every message owned by `user_id`, concurrently, reporting one
    /// aggregate outcome rather than per-message results.
    pub async fn clear(&self, user_id: &str) -> Result<usize, StoreError> {
        let messages = self.store.list(user_id).await?;
        let total = messages.len();

        let deletions = messages.iter().map(|m| self.store.delete(&m.id));
        let results = join_all(deletions).await;

        match results.into_iter().find_map(Result::err) {
            None => {
                info!("cleared {total} messages for {user_id}");
                Ok(total)
            }
            Some(e) => {
                warn!("clear for {user_id} failed: {e}");
                Err(e)
            }
        }
    }

    async fn append_with_retry(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        run_with_retry(&self.policy, || self.store.append(message.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMessageStore;
    use async_trait::async_trait;
    use domain::MessageRole;
    use llm::GenError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Store that fails the first `fail_first` appends, counting every
    /// attempted write.
    struct FlakyStore {
        inner: MemoryMessageStore,
        fail_first: u32,
        attempts: AtomicU32,
    }

    impl FlakyStore {
        fn new(fail_first: u32) -> Self {
            Self {
                inner: MemoryMessageStore::new(),
                fail_first,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MessageStore for FlakyStore {
        async fn append(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_first {
                return Err(StoreError::Network("write dropped".to_string()));
            }
            self.inner.append(message).await
        }

        async fn list(&self, user_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
            self.inner.list(user_id).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    struct CannedGenerator {
        reply: &'static str,
        calls: AtomicU32,
    }

    impl CannedGenerator {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ResponseGenerator for CannedGenerator {
        async fn generate(&self, _history: &[ChatMessage]) -> Result<String, GenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ResponseGenerator for FailingGenerator {
        async fn generate(&self, _history: &[ChatMessage]) -> Result<String, GenError> {
            Err(GenError::Other("model offline".to_string()))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn delivers_both_turns_in_order() {
        let store = Arc::new(MemoryMessageStore::new());
        let generator = Arc::new(CannedGenerator::new("Here are two internships."));
        let service = ChatService::new(store.clone(), generator).with_policy(fast_policy());

        let outcome = service.send("uid-1", "find internships").await;
        assert_eq!(
            outcome,
            SendOutcome::Delivered {
                reply: "Here are two internships.".to_string()
            }
        );

        let messages = store.list("uid-1").await.expect("list succeeds");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(messages[0].timestamp < messages[1].timestamp);
    }

    #[tokio::test]
    async fn flaky_writes_recover_without_duplicates() {
        let store = Arc::new(FlakyStore::new(2));
        let generator = Arc::new(CannedGenerator::new("ok"));
        let service =
            ChatService::new(store.clone(), generator).with_policy(fast_policy());

        let outcome = service.send("uid-1", "hello").await;
        assert!(matches!(outcome, SendOutcome::Delivered { .. }));

        // Two failed tries, one success, then the assistant write.
        assert_eq!(store.attempts.load(Ordering::SeqCst), 4);
        let messages = store.list("uid-1").await.expect("list succeeds");
        assert_eq!(messages.len(), 2, "no duplicate turns from the retries");
    }

    #[tokio::test]
    async fn exhausted_user_write_skips_the_assistant_turn() {
        let store = Arc::new(FlakyStore::new(u32::MAX));
        let generator = Arc::new(CannedGenerator::new("never sent"));
        let service =
            ChatService::new(store.clone(), generator.clone()).with_policy(fast_policy());

        let outcome = service.send("uid-1", "hello").await;
        assert_eq!(
            outcome,
            SendOutcome::NotSent {
                notice: SEND_FAILED_NOTICE.to_string()
            },
            "exactly one user-visible failure"
        );

        assert_eq!(store.attempts.load(Ordering::SeqCst), 3, "budget respected");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0, "no reply generated");
        assert!(store.list("uid-1").await.expect("list succeeds").is_empty());
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_canned_apology() {
        let store = Arc::new(MemoryMessageStore::new());
        let service = ChatService::new(store.clone(), Arc::new(FailingGenerator))
            .with_policy(fast_policy());

        let outcome = service.send("uid-1", "hello").await;
        match outcome {
            SendOutcome::Delivered { reply } => {
                assert_eq!(reply, fallback::TECHNICAL_DIFFICULTIES);
            }
            other => panic!("chat must stay usable, got {other:?}"),
        }

        let messages = store.list("uid-1").await.expect("list succeeds");
        assert_eq!(messages.len(), 2, "the apology is persisted as the reply");
    }

    #[tokio::test]
    async fn clear_removes_only_the_owners_messages() {
        let store = Arc::new(MemoryMessageStore::new());
        let generator = Arc::new(CannedGenerator::new("ok"));
        let service = ChatService::new(store.clone(), generator).with_policy(fast_policy());

        service.send("uid-1", "one").await;
        service.send("uid-1", "two").await;
        service.send("uid-2", "other").await;

        let removed = service.clear("uid-1").await.expect("clear succeeds");
        assert_eq!(removed, 4);

        assert!(store.list("uid-1").await.expect("list succeeds").is_empty());
        assert_eq!(store.list("uid-2").await.expect("list succeeds").len(), 2);
    }
}

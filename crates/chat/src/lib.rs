//! Conversation persistence and delivery: the message store behind chat,
//! the retry engine that wraps writes, the subscription supervisor that
//! feeds the view, and the send pipeline tying them to the generator.

pub mod feed;
pub mod rest_store;
pub mod retry;
pub mod service;
pub mod store;

pub use feed::{ChatEvent, ChatFeed};
pub use rest_store::RestMessageStore;
pub use retry::{run_with_retry, RetryPolicy, RetryState};
pub use service::{ChatService, SendOutcome};
pub use store::{MemoryMessageStore, MessageStore, StoreError};

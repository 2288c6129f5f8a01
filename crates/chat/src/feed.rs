//! Live view of a conversation: a supervisor task owns the subscription,
//! replaces the snapshot wholesale on every read, and restarts itself under
//! an explicit retry budget when the transport fails.

use crate::retry::{RetryPolicy, RetryState};
use crate::store::MessageStore;
use domain::ChatMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const EVENT_BUFFER: usize = 16;

pub const PERMANENT_FAILURE_NOTICE: &str =
    "Unable to connect to the chat service. Please check your internet connection.";
pub const RETRIES_EXHAUSTED_NOTICE: &str =
    "Could not connect to the chat service. Please try again later.";

/// What the view receives from the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Full snapshot, timestamp ascending. Replaces whatever the view held;
    /// there is no incremental patching.
    Snapshot(Vec<ChatMessage>),
    /// A transient failure; reconnect number `attempt` is scheduled.
    Reconnecting { attempt: u32 },
    /// Terminal: a permanent error, or the retry budget is spent.
    ConnectionLost { notice: String },
}

/// Handle to a running subscription. Dropping it (or calling `unsubscribe`)
/// is the only cancellation primitive; an in-flight append retry elsewhere
/// keeps running to completion or exhaustion.
pub struct ChatFeed {
    pub events: mpsc::Receiver<ChatEvent>,
    supervisor: JoinHandle<()>,
}

impl ChatFeed {
    /// Subscribes with the default reconnect budget and poll cadence.
    pub fn subscribe(store: Arc<dyn MessageStore>, user_id: impl Into<String>) -> Self {
        Self::subscribe_with(
            store,
            user_id,
            RetryPolicy::subscription(),
            DEFAULT_POLL_INTERVAL,
        )
    }

    pub fn subscribe_with(
        store: Arc<dyn MessageStore>,
        user_id: impl Into<String>,
        policy: RetryPolicy,
        poll_interval: Duration,
    ) -> Self {
        let user_id = user_id.into();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let supervisor = tokio::spawn(async move {
            supervise(store, user_id, policy, poll_interval, tx).await;
        });

        Self {
            events: rx,
            supervisor,
        }
    }

    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(self) {
        self.supervisor.abort();
    }
}

impl Drop for ChatFeed {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

/// Connecting → Active → (Error → Retrying → Connecting)* → Closed, with
/// the retry count reset to zero on every successful snapshot.
async fn supervise(
    store: Arc<dyn MessageStore>,
    user_id: String,
    policy: RetryPolicy,
    poll_interval: Duration,
    tx: mpsc::Sender<ChatEvent>,
) {
    let mut state = RetryState::begin();

    loop {
        match store.list(&user_id).await {
            Ok(messages) => {
                state = RetryState::begin();
                debug!("snapshot for {user_id}: {} messages", messages.len());
                if tx.send(ChatEvent::Snapshot(messages)).await.is_err() {
                    // Receiver dropped: the view unsubscribed.
                    return;
                }
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) if e.is_permanent() => {
                warn!("subscription for {user_id} hit permanent error: {e}");
                let _ = tx
                    .send(ChatEvent::ConnectionLost {
                        notice: PERMANENT_FAILURE_NOTICE.to_string(),
                    })
                    .await;
                return;
            }
            Err(e) => {
                let (next, pause) = state.on_failure(&policy);
                state = next;
                match (state, pause) {
                    (RetryState::Attempting(attempt), Some(delay)) => {
                        warn!("subscription for {user_id} failed ({e}), reconnect {attempt} in {delay:?}");
                        let _ = tx.send(ChatEvent::Reconnecting { attempt }).await;
                        tokio::time::sleep(delay).await;
                    }
                    _ => {
                        warn!("subscription for {user_id} failed ({e}), budget spent");
                        let _ = tx
                            .send(ChatEvent::ConnectionLost {
                                notice: RETRIES_EXHAUSTED_NOTICE.to_string(),
                            })
                            .await;
                        return;
                    }
                }
            }
        }
    }
}

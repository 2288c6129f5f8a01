//! Bounded-attempt retry with linear backoff, kept separate from any
//! transport so the transitions are unit-testable without I/O.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt budget plus the backoff base. The delay after a failed attempt
/// `n` is `base_delay * n` (linear, not exponential).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy for message writes: three tries, 1s/2s pauses between them.
    pub const fn append() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }

    /// Policy for the live subscription: the initial connect plus three
    /// reconnects, 2s/4s/6s pauses between them.
    pub const fn subscription() -> Self {
        Self::new(4, Duration::from_millis(2000))
    }

    /// Pure backoff function: how long to wait after failed attempt `n`
    /// (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Explicit retry lifecycle. Transitions take the policy as input and carry
/// no transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting(u32),
    Succeeded,
    Exhausted,
}

impl RetryState {
    /// Leaves `Idle` for the first attempt; other states are unaffected.
    pub fn start(self) -> Self {
        match self {
            RetryState::Idle => RetryState::Attempting(1),
            other => other,
        }
    }

    /// A fresh machine already past `Idle`.
    pub fn begin() -> Self {
        RetryState::Idle.start()
    }

    pub fn on_success(self) -> Self {
        RetryState::Succeeded
    }

    /// After a failed attempt: the follow-up state, plus the pause to take
    /// before the next attempt (None once the budget is spent).
    pub fn on_failure(self, policy: &RetryPolicy) -> (Self, Option<Duration>) {
        match self {
            RetryState::Attempting(n) if n < policy.max_attempts => {
                (RetryState::Attempting(n + 1), Some(policy.delay(n)))
            }
            _ => (RetryState::Exhausted, None),
        }
    }
}

/// Drives an async operation through the retry state machine. Returns the
/// last error once the attempt budget is exhausted; every failure class is
/// retried (classification is the subscription supervisor's concern).
pub async fn run_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut state = RetryState::begin();

    loop {
        let attempt = match state {
            RetryState::Attempting(n) => n,
            _ => unreachable!("driver only loops while attempting"),
        };

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let (next, pause) = state.on_failure(policy);
                state = next;
                match pause {
                    Some(delay) => {
                        warn!(
                            "attempt {attempt}/{} failed ({error}), retrying in {delay:?}",
                            policy.max_attempts
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(
                            "attempt {attempt}/{} failed ({error}), giving up",
                            policy.max_attempts
                        );
                        return Err(error);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_grow_linearly() {
        let policy = RetryPolicy::append();
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));

        let policy = RetryPolicy::subscription();
        assert_eq!(policy.delay(1), Duration::from_millis(2000));
        assert_eq!(policy.delay(2), Duration::from_millis(4000));
        assert_eq!(policy.delay(3), Duration::from_millis(6000));
    }

    #[test]
    fn state_machine_exhausts_after_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let state = RetryState::Idle.start();
        assert_eq!(state, RetryState::Attempting(1));

        let (state, pause) = state.on_failure(&policy);
        assert_eq!(state, RetryState::Attempting(2));
        assert_eq!(pause, Some(Duration::from_millis(10)));

        let (state, pause) = state.on_failure(&policy);
        assert_eq!(state, RetryState::Attempting(3));
        assert_eq!(pause, Some(Duration::from_millis(20)));

        let (state, pause) = state.on_failure(&policy);
        assert_eq!(state, RetryState::Exhausted);
        assert_eq!(pause, None);
    }

    #[test]
    fn success_is_terminal() {
        assert_eq!(RetryState::begin().on_success(), RetryState::Succeeded);
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<u32, String> = run_with_retry(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err("transient".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_exactly_at_the_budget() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<u32, String> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("always".to_string()) }
        })
        .await;

        assert_eq!(result, Err("always".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "no writes beyond the budget");
    }
}

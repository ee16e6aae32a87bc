//! Request deadlines and bounded execution of external calls.
//!
//! Every call to the store, cache, or event bus is bounded by the deadline of
//! the request that triggered it. Store calls are spawned onto their own task
//! before being awaited: when the deadline passes the caller gets
//! [`CallError::Timeout`] but the spawned call keeps running, because the
//! effects it may have (a written hash, an issued token) cannot be rolled
//! back.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::TraceId;

/// Absolute point in time by which an operation must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Deadline at an explicit instant.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// Underlying tokio instant.
    #[must_use]
    pub const fn instant(self) -> Instant {
        self.0
    }

    /// Time left before the deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn is_expired(self) -> bool {
        Instant::now() >= self.0
    }
}

/// Failure modes of a bounded call, independent of the call's own error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The deadline passed before the call finished.
    #[error("{operation} exceeded the request deadline")]
    Timeout {
        /// Name of the bounded operation.
        operation: &'static str,
    },
    /// The spawned task panicked or was aborted.
    #[error("{operation} task failed: {message}")]
    Aborted {
        /// Name of the bounded operation.
        operation: &'static str,
        /// Join error description.
        message: String,
    },
}

/// Await `fut` until `deadline`, dropping it if the deadline passes first.
///
/// Suitable for reads whose cancellation has no side effects.
pub async fn within<F>(
    deadline: Deadline,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, CallError>
where
    F: Future,
{
    tokio::time::timeout_at(deadline.instant(), fut)
        .await
        .map_err(|_| CallError::Timeout { operation })
}

/// Spawn `fut` and await it until `deadline`.
///
/// On timeout the spawned task is left running to completion. The caller's
/// trace identifier is propagated into the task.
pub async fn run_to_completion<F>(
    deadline: Deadline,
    operation: &'static str,
    fut: F,
) -> Result<F::Output, CallError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handle = tokio::spawn(TraceId::propagate(fut));
    match tokio::time::timeout_at(deadline.instant(), handle).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(join_error)) => Err(CallError::Aborted {
            operation,
            message: join_error.to_string(),
        }),
        Err(_) => Err(CallError::Timeout { operation }),
    }
}

#[cfg(test)]
mod tests {
    //! Deadline behaviour under paused tokio time.
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn within_returns_output_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let result = within(deadline, "fast", async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn within_times_out_slow_calls() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let result = within(deadline, "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        })
        .await;
        assert_eq!(result, Err(CallError::Timeout { operation: "slow" }));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn run_to_completion_keeps_running_after_timeout() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let deadline = Deadline::after(Duration::from_millis(10));

        let result = run_to_completion(deadline, "store.create_user", async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        })
        .await;

        assert_eq!(
            result,
            Err(CallError::Timeout {
                operation: "store.create_user"
            })
        );
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst), "spawned call must finish");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn remaining_saturates_at_zero() {
        let deadline = Deadline::after(Duration::from_millis(5));
        tokio::time::advance(Duration::from_millis(10)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}

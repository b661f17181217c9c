//! Cancellation and deadline propagation for lifecycle calls.

use crate::error::ResourceError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Carries cancellation and an optional deadline into every lifecycle call.
///
/// Blocking operations (network I/O, backoff sleeps, reconnect sequences)
/// race against [`done`](Self::done) so that cancelling the token or passing
/// the deadline aborts them promptly with [`ResourceError::Cancelled`] or
/// [`ResourceError::DeadlineExceeded`].
///
/// Cloning a context shares its token; [`child`](Self::child) derives a
/// context that is cancelled with its parent but can also be cancelled on its own.
///
/// ```rust
/// use lifeline_core::{Context, ResourceError};
/// use std::time::Duration;
///
/// # async fn example() {
/// let cx = Context::new().with_timeout(Duration::from_secs(5));
/// let result = cx
///     .run(async { Ok::<_, ResourceError>(42) })
///     .await;
/// assert_eq!(result.unwrap(), 42);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Creates a context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by an existing cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            deadline: None,
        }
    }

    /// Returns a copy whose deadline is at most `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    /// Returns a copy whose deadline is at most `deadline`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Derives a context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns the underlying cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the context error if the context is already cancelled or expired.
    pub fn err(&self) -> Option<ResourceError> {
        if self.cancellation.is_cancelled() {
            return Some(ResourceError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ResourceError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes when the context is cancelled or its deadline passes.
    ///
    /// Never completes for a context without deadline that is never cancelled.
    pub async fn done(&self) -> ResourceError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => ResourceError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ResourceError::DeadlineExceeded,
            },
            None => {
                self.cancellation.cancelled().await;
                ResourceError::Cancelled
            }
        }
    }

    /// Drives `future` to completion unless the context ends first.
    pub async fn run<F, T>(&self, future: F) -> Result<T, ResourceError>
    where
        F: Future<Output = Result<T, ResourceError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = future => result,
        }
    }

    /// Sleeps for `duration` unless the context ends first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ResourceError> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

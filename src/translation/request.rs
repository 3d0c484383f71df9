/*!
 * Per-request context: deadline and cancellation.
 *
 * Every await point of the pipeline races against the context so a request
 * can be abandoned (e.g. the overlay was dismissed) without waiting for the
 * remaining chunks and retries.
 */

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Why a request stopped before completing its work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The caller cancelled the request
    Cancelled,
    /// The request deadline passed
    DeadlineExceeded,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable handle used to cancel an in-flight request
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    state: Arc<CancelState>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every request observing this handle
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Deadline and cancellation for one translation request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancellation: CancellationHandle,
}

impl RequestContext {
    /// Context that is never cancelled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the request after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Observe an existing cancellation handle
    pub fn with_cancellation(mut self, cancellation: CancellationHandle) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn cancellation(&self) -> &CancellationHandle {
        &self.cancellation
    }

    /// Current interrupt state, if any
    pub fn check(&self) -> Option<Interrupt> {
        if self.cancellation.is_cancelled() {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    async fn interrupted(&self) -> Interrupt {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancellation.cancelled() => Interrupt::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
                }
            }
            None => {
                self.cancellation.cancelled().await;
                Interrupt::Cancelled
            }
        }
    }

    /// Drive `future` to completion unless the request is interrupted first
    pub async fn run<F, T>(&self, future: F) -> Result<T, Interrupt>
    where
        F: Future<Output = T>,
    {
        if let Some(interrupt) = self.check() {
            return Err(interrupt);
        }
        tokio::select! {
            biased;
            interrupt = self.interrupted() => Err(interrupt),
            value = future => Ok(value),
        }
    }

    /// Sleep for `duration` unless the request is interrupted first
    pub async fn sleep(&self, duration: Duration) -> Result<(), Interrupt> {
        if duration.is_zero() {
            return match self.check() {
                Some(interrupt) => Err(interrupt),
                None => Ok(()),
            };
        }
        self.run(tokio::time::sleep(duration)).await
    }
}

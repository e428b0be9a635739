// crates/forge-core/src/cancellation.rs
// ============================================================================
// Module: Cancellation
// Description: A small, explicit cancellation context passed through
//              orchestration and protocol calls.
// Purpose: Implement §5.1's cancellation context type: an `Arc<AtomicBool>`
//          handle with async wake-up, passed by reference rather than
//          relying on ambient/thread-local state (§9 "Global state").
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! [`CancellationToken`] is cloned cheaply and threaded explicitly through
//! every orchestrator and Tool Client call. Calling [`CancellationToken::cancel`]
//! flips a shared flag and wakes every waiter registered via
//! [`CancellationToken::cancelled`]. This mirrors the teacher's preference
//! for explicit, passed-in context objects over global mutable state,
//! generalized here from the Artifact Store mutex to cancellation.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::sync::Notify;

/// Shared state behind a [`CancellationToken`].
#[derive(Debug, Default)]
struct Inner {
    /// Set once by [`CancellationToken::cancel`]; never unset.
    cancelled: AtomicBool,
    /// Wakes every pending [`CancellationToken::cancelled`] waiter.
    notify: Notify,
}

/// A cheaply cloned, explicit cancellation context for one pipeline run.
///
/// # Invariants
/// - Cancellation is one-way: once cancelled, a token never un-cancels.
/// - All clones of a token observe the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Shared cancellation flag and waiter list.
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Builds a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this token (and every clone) as cancelled and wakes all
    /// waiters.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns true if [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once this token is cancelled. Resolves immediately if it is
    /// already cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
            if self.is_cancelled() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn starts_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancelled().await;
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel_from_another_task() {
        let token = CancellationToken::new();
        let waiter_token = token.clone();
        let waiter = tokio::spawn(async move {
            waiter_token.cancelled().await;
        });
        tokio::task::yield_now().await;
        token.cancel();
        waiter.await.expect("join");
    }
}

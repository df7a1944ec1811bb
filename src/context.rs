//! context.rs - Cooperative Cancellation and Deadlines
//!
//! Every public operation accepts an [`OperationContext`] carrying a shared
//! cancellation flag and an optional deadline. Engines poll the context at
//! the boundaries of their outer loops (per wall, per junction, per healing
//! iteration) and stop early when asked to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The reason an operation stopped before finishing its work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The caller requested cancellation through the shared flag
    Cancelled,
    /// The operation's deadline passed
    DeadlineExceeded,
}

/// Shared cancellation flag plus an optional deadline
///
/// Contexts are cheap to clone; clones share the same cancellation flag,
/// so a handle kept by the caller can stop work already dispatched to a
/// worker. The default context never cancels and never times out.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// Create a context that never cancels and never times out
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose deadline is `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation of every operation sharing this context
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// True once `cancel()` has been called on any clone of this context
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// True once the deadline (if any) has passed
    pub fn is_expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Poll the context at an outer-loop boundary
    ///
    /// Returns the interrupt kind when the operation should stop, with
    /// cancellation taking precedence over deadline expiry.
    pub fn check(&self) -> Result<(), Interrupt> {
        if self.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        if self.is_expired() {
            return Err(Interrupt::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_never_interrupts() {
        let ctx = OperationContext::new();
        assert!(ctx.check().is_ok());
        assert!(!ctx.is_cancelled());
        assert!(!ctx.is_expired());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = OperationContext::new();
        let handle = ctx.clone();
        handle.cancel();
        assert_eq!(ctx.check(), Err(Interrupt::Cancelled));
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        let ctx = OperationContext::with_timeout(Duration::from_secs(0));
        assert_eq!(ctx.check(), Err(Interrupt::DeadlineExceeded));
    }
}

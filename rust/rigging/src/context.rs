//! Per-call execution context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::Failure;

/// Deadline and cancellation for one call.
///
/// Clones share the cancellation flag: cancelling any clone cancels them all.
/// Deriving a context with [`Context::with_timeout`] keeps the flag and only
/// ever tightens the deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// A context with no deadline that is never cancelled unless asked to be.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`, or earlier if this one does.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`, or earlier if this one does.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            deadline: Some(deadline),
            cancelled: self.cancelled.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `Some(ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail fast when the call is cancelled or out of time.
    pub fn check(&self) -> Result<(), Failure> {
        if self.is_cancelled() {
            return Err(Failure::Cancelled);
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(Failure::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_never_expires() {
        let ctx = Context::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn derived_deadline_only_tightens() {
        let outer = Context::background().with_timeout(Duration::from_millis(50));
        let inner = outer.with_timeout(Duration::from_secs(60));
        assert_eq!(inner.deadline(), outer.deadline());

        let tighter = outer.with_timeout(Duration::from_millis(1));
        assert!(tighter.deadline() < outer.deadline());
    }

    #[test]
    fn expired_deadline_fails_check() {
        let ctx = Context::background().with_deadline(Instant::now());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert_eq!(ctx.check(), Err(Failure::DeadlineExceeded));
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = Context::background();
        let child = ctx.with_timeout(Duration::from_secs(60));
        child.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check(), Err(Failure::Cancelled));
    }
}

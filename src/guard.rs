//! Monotonic shutdown guard shared by channel, poller, and orchestrator.
//!
//! Every scheduled continuation (retry timer fire, interval tick, transport
//! event) re-checks the guard at fire time, so a `close()` that races with
//! already-scheduled work always wins.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-way closed flag. Once tripped it never resets.
#[derive(Debug, Default)]
pub struct ShutdownGuard {
    closed: AtomicBool,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the guard. Returns `true` for the first caller only, making
    /// idempotent teardown a one-line check at each `close()` entry point.
    pub fn trip(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    /// Check whether the guard has been tripped.
    pub fn is_tripped(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trip_wins() {
        let guard = ShutdownGuard::new();
        assert!(!guard.is_tripped());
        assert!(guard.trip());
        assert!(guard.is_tripped());
    }

    #[test]
    fn trip_is_idempotent() {
        let guard = ShutdownGuard::new();
        assert!(guard.trip());
        assert!(!guard.trip());
        assert!(!guard.trip());
        assert!(guard.is_tripped());
    }
}

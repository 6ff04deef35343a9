//! Cooperative stop signalling for an in-flight run.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A stop request shared between the command surface and the running loop.
///
/// Stopping is cooperative: the loop polls [`StopToken::is_stopped`] at its
/// suspension points. The first recorded reason wins; later requests are
/// idempotent.
#[derive(Debug, Default)]
pub struct StopToken {
    stopped: AtomicBool,
    reason: RwLock<Option<String>>,
}

impl StopToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop with a reason.
    pub fn request(&self, reason: impl Into<String>) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            *self.reason.write() = Some(reason.into());
        }
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The first recorded stop reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Re-arms the token for a fresh run.
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
        *self.reason.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reason_wins() {
        let token = StopToken::new();
        assert!(!token.is_stopped());
        assert_eq!(token.reason(), None);

        token.request("user stop");
        token.request("shutdown");

        assert!(token.is_stopped());
        assert_eq!(token.reason().as_deref(), Some("user stop"));
    }

    #[test]
    fn test_reset_rearms() {
        let token = StopToken::new();
        token.request("user stop");
        token.reset();
        assert!(!token.is_stopped());
        assert_eq!(token.reason(), None);
    }
}

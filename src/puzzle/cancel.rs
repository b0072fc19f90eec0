//! Defines [`CancelToken`], the cooperative cancellation handle.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable handle used to interrupt long-running operations (solves and
/// database builds) on the puzzle it was obtained from.
///
/// Cancellation is cooperative: the engines poll the token at depth-bound
/// increments, the database builders between patterns and mining passes. An
/// operation that observes the token releases its scratch state, reports
/// [`SolveError::Canceled`], and clears the token so that subsequent
/// operations on the puzzle work normally.
///
/// [`SolveError::Canceled`]: crate::puzzle::puzzle::SolveError::Canceled
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

/// Internal marker error: an operation observed its [`CancelToken`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Canceled;

impl CancelToken {
    /// Creates a token in the not-canceled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the operation in progress (if any).
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested and not yet consumed.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Consumes a pending cancellation request. Returns whether one was
    /// pending.
    pub(crate) fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes() {
        let token = CancelToken::new();
        assert!(!token.is_canceled());
        token.cancel();
        assert!(token.is_canceled());
        assert!(token.take());
        assert!(!token.is_canceled());
        assert!(!token.take());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_canceled());
    }
}

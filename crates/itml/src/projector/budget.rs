//! Run-time limits for a projection: a wall-clock budget and a cancellation
//! flag, both checked once per iteration.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// A cloneable flag for cancelling a running projection from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a new, unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone of the token observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Limits on a single projection run, beyond its iteration cap.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    /// The maximum wall-clock time for the run.
    time_limit: Option<Duration>,
    /// A token through which the run may be cancelled.
    cancel: Option<CancelToken>,
}

impl Budget {
    /// A budget with no time limit and no cancellation token.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Sets the maximum wall-clock time for the run.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Sets the token through which the run may be cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The time limit, if any.
    #[must_use]
    pub const fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// The instant at which a run starting now must stop.
    ///
    /// `None` if there is no limit or the limit overflows the clock.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.time_limit.and_then(|limit| Instant::now().checked_add(limit))
    }

    /// Whether cancellation was requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Budget, CancelToken};

    #[test]
    fn token_is_shared() {
        let token = CancelToken::new();
        let budget = Budget::unbounded().with_cancel_token(token.clone());
        assert!(!budget.is_cancelled());

        token.cancel();
        assert!(budget.is_cancelled());
    }

    #[test]
    fn deadlines() {
        assert!(Budget::unbounded().deadline().is_none());
        assert!(Budget::unbounded().with_time_limit(Duration::MAX).deadline().is_none());
        assert!(Budget::unbounded()
            .with_time_limit(Duration::from_secs(1))
            .deadline()
            .is_some());
    }
}

//! Retry scheduling
//!
//! After a pass, modules reporting unfinished work get another pass after
//! `base * attempt` milliseconds. Attempts are capped, at most one retry
//! is outstanding, and the count resets on an explicit re-initialization.

/// Retry bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryScheduler {
    attempts: u32,
    max_attempts: u32,
    pending: bool,
    exhausted_logged: bool,
}

impl RetryScheduler {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            pending: false,
            exhausted_logged: false,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Delay before the next retry, or `None` when no retry should be
    /// scheduled. A returned delay counts as an attempt and marks the
    /// retry outstanding.
    pub fn plan(&mut self, unfinished: bool, base_ms: u64) -> Option<u64> {
        if !unfinished || self.pending {
            return None;
        }
        if self.is_exhausted() {
            if !self.exhausted_logged {
                tracing::warn!("Giving up after {} retries; unfinished work remains", self.max_attempts);
                self.exhausted_logged = true;
            }
            return None;
        }
        self.attempts += 1;
        self.pending = true;
        let delay = base_ms.saturating_mul(u64::from(self.attempts));
        tracing::debug!("Retry {}/{} in {}ms", self.attempts, self.max_attempts, delay);
        Some(delay)
    }

    /// The outstanding retry fired or was cancelled
    pub fn settle(&mut self) {
        self.pending = false;
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.pending = false;
        self.exhausted_logged = false;
    }
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff_and_cap() {
        let mut retry = RetryScheduler::new(3);
        assert_eq!(retry.plan(true, 1000), Some(1000));
        assert_eq!(retry.plan(true, 1000), None);
        retry.settle();
        assert_eq!(retry.plan(true, 1000), Some(2000));
        retry.settle();
        assert_eq!(retry.plan(true, 1000), Some(3000));
        retry.settle();
        assert_eq!(retry.plan(true, 1000), None);
        assert!(retry.is_exhausted());

        retry.reset();
        assert_eq!(retry.plan(true, 2000), Some(2000));
    }

    #[test]
    fn test_nothing_unfinished() {
        let mut retry = RetryScheduler::default();
        assert_eq!(retry.plan(false, 1000), None);
        assert_eq!(retry.attempts(), 0);
    }
}

//! Timer queue
//!
//! setTimeout/clearTimeout over a virtual millisecond clock. Time only
//! moves when the owner advances it, so a pass scheduled for 200ms later
//! fires exactly when the clock crosses that deadline.

use std::collections::HashMap;
use std::time::Duration;

/// Handle returned by `set_timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work a timer runs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Debounced pass after relevant insertions
    Rerun,
    /// Retry pass for modules with unfinished work
    Retry,
}

/// Timer entry
#[derive(Debug, Clone)]
pub struct Timer {
    pub id: TimerId,
    pub task: Task,
    pub deadline_ms: u64,
}

/// Timer manager
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: HashMap<TimerId, Timer>,
    now_ms: u64,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Add a timeout
    pub fn set_timeout(&mut self, task: Task, delay_ms: u64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, Timer {
            id,
            task,
            deadline_ms: self.now_ms.saturating_add(delay_ms),
        });
        id
    }

    /// Clear a timer. Returns false if it already fired or never existed.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Deadline of the earliest timer
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|t| t.deadline_ms).min()
    }

    /// Remove and return the earliest timer due at or before `limit_ms`,
    /// moving the clock to its deadline. Ties fire in creation order.
    pub fn pop_due(&mut self, limit_ms: u64) -> Option<Timer> {
        let id = self
            .timers
            .values()
            .filter(|t| t.deadline_ms <= limit_ms)
            .min_by_key(|t| (t.deadline_ms, t.id))
            .map(|t| t.id)?;
        let timer = self.timers.remove(&id)?;
        self.now_ms = self.now_ms.max(timer.deadline_ms);
        Some(timer)
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Get time until next timer fires
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(self.now_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_queue() {
        let mut tq = TimerQueue::new();

        let id1 = tq.set_timeout(Task::Rerun, 100);
        let id2 = tq.set_timeout(Task::Retry, 200);

        assert!(tq.has_pending());
        assert_eq!(tq.time_until_next(), Some(Duration::from_millis(100)));

        assert!(tq.clear(id1));
        assert!(!tq.clear(id1));
        assert!(tq.has_pending());

        tq.clear(id2);
        assert!(!tq.has_pending());
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut tq = TimerQueue::new();
        tq.set_timeout(Task::Retry, 300);
        tq.set_timeout(Task::Rerun, 100);
        tq.set_timeout(Task::Retry, 100);

        assert!(tq.pop_due(50).is_none());

        let first = tq.pop_due(1000).unwrap();
        assert_eq!((first.task, first.deadline_ms), (Task::Rerun, 100));
        assert_eq!(tq.now_ms(), 100);

        let second = tq.pop_due(1000).unwrap();
        assert_eq!((second.task, second.deadline_ms), (Task::Retry, 100));

        let third = tq.pop_due(1000).unwrap();
        assert_eq!(third.deadline_ms, 300);
        assert_eq!(tq.now_ms(), 300);
        assert!(tq.is_empty());
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut tq = TimerQueue::new();
        tq.advance_to(1_000);
        tq.set_timeout(Task::Rerun, 200);
        assert_eq!(tq.next_deadline(), Some(1_200));

        tq.advance_to(500);
        assert_eq!(tq.now_ms(), 1_000);
    }
}

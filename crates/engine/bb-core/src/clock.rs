//! Wall clock
//!
//! Modules read the calendar date through this trait instead of calling
//! `Utc::now()` directly, so a rendered year or cache age can be pinned
//! in tests.

use std::cell::Cell;

use chrono::{DateTime, Datelike, Duration, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn year(&self) -> i32 {
        self.now().year()
    }
}

/// Real time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven time
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap());
        assert_eq!(clock.year(), 2024);
        clock.advance(Duration::hours(2));
        assert_eq!(clock.year(), 2025);
    }
}

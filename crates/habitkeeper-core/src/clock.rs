//! Injectable time source.
//!
//! Every streak evaluation call site reads the current time through [`Clock`]
//! so tests can pin or advance it deterministically. Timestamps carry no
//! timezone and are truncated to whole seconds, matching the storage format.

use std::cell::Cell;

use chrono::{Duration, NaiveDateTime, Timelike, Utc};

/// Supplier of the current timestamp.
pub trait Clock {
    /// Current time, truncated to whole seconds.
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Programmable clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

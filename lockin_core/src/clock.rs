//! Time source for the session engine.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::cell::Cell;

/// Supplies "now" to the engine
pub trait Clock {
    /// Epoch milliseconds
    fn now_ms(&self) -> i64;

    /// Local calendar day of `now_ms`
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-advanced clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Clock at local midnight plus `hour:minute` on the given day
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        let naive = date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        let now = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(Local::now);
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        self.now.get().date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

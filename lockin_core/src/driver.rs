//! Clock driver: feeds one tick per interval to an active session.
//!
//! The driver runs on the caller's thread. It stops ticking as soon as the
//! session is no longer active, and hands every change to an observer so the
//! caller can persist and notify.

use crate::{Clock, Result, SessionCompleted, SessionEngine, SessionRecord, StoreSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Waits out one tick interval
pub trait Ticker {
    fn wait(&mut self);
}

/// Sleeps a fixed interval between ticks
#[derive(Clone, Copy, Debug)]
pub struct IntervalTicker {
    interval: Duration,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One tick per second
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for IntervalTicker {
    fn wait(&mut self) {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
    }
}

/// What changed, reported to the observer with the new state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveEvent {
    Tick,
    Completed(SessionCompleted),
    Interrupted(Option<SessionRecord>),
}

/// How a drive ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Countdown reached zero and was recorded
    Completed(SessionCompleted),
    /// Cancelled; the session was paused with its elapsed time recorded
    Interrupted(Option<SessionRecord>),
    /// Nothing to drive (session idle, or started at zero)
    Idle,
}

/// Tick `engine` until it completes, goes idle, or `cancel` is raised.
///
/// An observer error stops the drive and is returned as-is.
pub fn run_session<C, T, F>(
    engine: &mut SessionEngine<C>,
    ticker: &mut T,
    cancel: &AtomicBool,
    mut observer: F,
) -> Result<DriveOutcome>
where
    C: Clock,
    T: Ticker,
    F: FnMut(DriveEvent, &StoreSnapshot) -> Result<()>,
{
    let mut ticks: u64 = 0;
    loop {
        if let Some(done) = engine.check_completion() {
            tracing::debug!("Session completed after {} ticks", ticks);
            observer(DriveEvent::Completed(done), engine.snapshot())?;
            return Ok(DriveOutcome::Completed(done));
        }

        if !engine.is_active() {
            return Ok(DriveOutcome::Idle);
        }

        ticker.wait();

        if cancel.load(Ordering::SeqCst) {
            let record = engine.pause();
            tracing::info!("Drive interrupted after {} ticks", ticks);
            observer(DriveEvent::Interrupted(record), engine.snapshot())?;
            return Ok(DriveOutcome::Interrupted(record));
        }

        engine.tick();
        ticks += 1;
        observer(DriveEvent::Tick, engine.snapshot())?;
    }
}

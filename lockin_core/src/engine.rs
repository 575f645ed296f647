//! Session engine: the work/rest countdown state machine.
//!
//! The engine holds no threads and does no I/O. A driver calls `tick()` once
//! per second while the session is active and `check_completion()` after each
//! tick; the owner saves `snapshot()` after every mutating call.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause/stop/completion--> Idle
//! ```
//!
//! Mode (work/rest) is a separate axis, changed by `toggle_mode()`.

use crate::{
    Clock, ProgressLedger, SessionCompleted, SessionRecord, Settings, SettingsUpdate,
    StoreSnapshot, SystemClock, TimerState,
};

/// Owns settings, the current countdown and the progress ledger
#[derive(Debug)]
pub struct SessionEngine<C = SystemClock> {
    store: StoreSnapshot,
    clock: C,
}

impl SessionEngine<SystemClock> {
    /// Engine over a loaded store using the wall clock
    pub fn new(store: StoreSnapshot) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> SessionEngine<C> {
    pub fn with_clock(store: StoreSnapshot, clock: C) -> Self {
        Self { store, clock }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.store.settings
    }

    pub fn current_session(&self) -> &TimerState {
        &self.store.current_session
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.store.daily_progress
    }

    pub fn is_active(&self) -> bool {
        self.store.current_session.is_active
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Full state for persistence
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.store
    }

    pub fn into_snapshot(self) -> StoreSnapshot {
        self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Merge new durations into the settings.
    ///
    /// A changed duration for the current mode re-baselines the countdown
    /// immediately, even mid-session.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        let mode = self.store.current_session.mode;
        let previous = self.store.settings.duration_for(mode);

        if let Some(work) = update.work_duration {
            self.store.settings.work_duration = work;
        }
        if let Some(rest) = update.rest_duration {
            self.store.settings.rest_duration = rest;
        }

        if let Some(new_duration) = update.duration_for(mode) {
            if new_duration != previous {
                let session = &mut self.store.current_session;
                session.time_remaining = new_duration;
                session.initial_duration = new_duration;
                tracing::info!(
                    "{} duration changed to {}s, countdown re-baselined",
                    mode,
                    new_duration
                );
            }
        }
    }

    /// Start or resume the countdown.
    ///
    /// The remaining time becomes the new elapsed baseline, so a resumed
    /// session only credits what runs after the resume. Calling this while
    /// running re-arms the baseline.
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        let session = &mut self.store.current_session;
        if session.is_active {
            tracing::debug!("start() while running, re-arming baseline");
        }
        session.is_active = true;
        session.start_time = Some(now);
        session.initial_duration = session.time_remaining;
        tracing::info!(
            "Started {} session with {}s remaining",
            session.mode,
            session.time_remaining
        );
    }

    /// Count down one second, stopping at zero
    pub fn tick(&mut self) {
        let session = &mut self.store.current_session;
        session.time_remaining = session.time_remaining.saturating_sub(1);
    }

    /// Stop the countdown where it is, crediting the elapsed time
    pub fn pause(&mut self) -> Option<SessionRecord> {
        let record = self.finish_run();
        tracing::info!(
            "Paused {} session with {}s remaining",
            self.store.current_session.mode,
            self.store.current_session.time_remaining
        );
        record
    }

    /// Credit the elapsed time, then reset to the full configured duration
    pub fn stop(&mut self) -> Option<SessionRecord> {
        let record = self.finish_run();
        self.reset_countdown();
        tracing::info!("Stopped {} session", self.store.current_session.mode);
        record
    }

    /// Reset to the full configured duration without crediting anything.
    ///
    /// While running, the elapsed time since the last start is dropped.
    pub fn reset(&mut self) {
        self.warn_if_discarding("reset");
        self.reset_countdown();
        tracing::info!("Reset {} session", self.store.current_session.mode);
    }

    /// Switch between work and rest at the new mode's full duration.
    ///
    /// While running, the elapsed time since the last start is dropped.
    pub fn toggle_mode(&mut self) {
        self.warn_if_discarding("toggle_mode");
        self.store.current_session.mode = self.store.current_session.mode.toggled();
        self.reset_countdown();
        tracing::info!("Switched to {} mode", self.store.current_session.mode);
    }

    /// Finish a running session that has counted down to zero.
    ///
    /// Returns the completion once per zero-crossing: the session is idle
    /// afterwards, so later calls return `None` until it is started again.
    /// A session started at zero just goes idle.
    pub fn check_completion(&mut self) -> Option<SessionCompleted> {
        let session = &self.store.current_session;
        if !session.is_active || session.time_remaining > 0 {
            return None;
        }

        let mode = session.mode;
        let record = self.finish_run()?;
        tracing::info!("{} session complete ({}s)", mode, record.duration);
        Some(SessionCompleted { mode, record })
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Go idle, recording elapsed time if a run was in progress
    fn finish_run(&mut self) -> Option<SessionRecord> {
        let now = self.clock.now_ms();
        let today = self.clock.today();
        let session = &mut self.store.current_session;

        let record = match session.start_time {
            Some(_) if session.elapsed() > 0 => Some(SessionRecord {
                duration: session.elapsed(),
                timestamp: now,
                session_type: session.mode,
            }),
            _ => None,
        };

        session.is_active = false;
        session.start_time = None;

        if let Some(record) = record {
            self.store.daily_progress.record_session(record, today);
        }
        record
    }

    fn reset_countdown(&mut self) {
        let mode = self.store.current_session.mode;
        self.store.current_session = TimerState::idle(mode, &self.store.settings);
    }

    fn warn_if_discarding(&self, operation: &str) {
        let session = &self.store.current_session;
        if session.is_active && session.elapsed() > 0 {
            tracing::warn!(
                "{} while running discards {}s of unrecorded {} time",
                operation,
                session.elapsed(),
                session.mode
            );
        }
    }
}

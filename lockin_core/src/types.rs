//! Core domain types for the LockIn focus timer.
//!
//! This module defines the fundamental types used throughout the system:
//! - Session modes and settings
//! - Completed session records
//! - The single timer state
//! - The persisted store snapshot

use crate::ledger::ProgressLedger;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default work session length (60 minutes)
pub const DEFAULT_WORK_SECONDS: u32 = 60 * 60;

/// Default rest session length (10 minutes)
pub const DEFAULT_REST_SECONDS: u32 = 10 * 60;

// ============================================================================
// Session Types
// ============================================================================

/// Which kind of countdown is running
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Work,
    Rest,
}

impl SessionType {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            SessionType::Work => SessionType::Rest,
            SessionType::Rest => SessionType::Work,
        }
    }

    /// Lowercase identifier, as stored on disk
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::Rest => "rest",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionType::Work => "Work",
            SessionType::Rest => "Rest",
        };
        write!(f, "{label}")
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Configured session durations, in seconds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub work_duration: u32,
    pub rest_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_SECONDS,
            rest_duration: DEFAULT_REST_SECONDS,
        }
    }
}

impl Settings {
    /// Configured duration for the given mode
    pub fn duration_for(&self, mode: SessionType) -> u32 {
        match mode {
            SessionType::Work => self.work_duration,
            SessionType::Rest => self.rest_duration,
        }
    }
}

/// Partial settings change; absent fields are left untouched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub work_duration: Option<u32>,
    pub rest_duration: Option<u32>,
}

impl SettingsUpdate {
    /// Build an update from whole minutes, the unit users enter
    pub fn from_minutes(work_minutes: Option<u32>, rest_minutes: Option<u32>) -> Self {
        Self {
            work_duration: work_minutes.map(|m| m.saturating_mul(60)),
            rest_duration: rest_minutes.map(|m| m.saturating_mul(60)),
        }
    }

    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.work_duration.is_none() && self.rest_duration.is_none()
    }

    /// The supplied value for one mode, if any
    pub fn duration_for(&self, mode: SessionType) -> Option<u32> {
        match mode {
            SessionType::Work => self.work_duration,
            SessionType::Rest => self.rest_duration,
        }
    }

    /// Reject zero durations before they reach the engine
    pub fn validate(&self) -> Result<()> {
        if self.work_duration == Some(0) {
            return Err(Error::Validation(
                "work duration must be greater than zero".into(),
            ));
        }
        if self.rest_duration == Some(0) {
            return Err(Error::Validation(
                "rest duration must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Session Records
// ============================================================================

/// A completed (or partially completed) session, as credited to the ledger
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Elapsed seconds, not the configured duration
    pub duration: u32,
    /// Epoch milliseconds at completion
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

impl SessionRecord {
    pub fn is_work(&self) -> bool {
        self.session_type == SessionType::Work
    }

    pub fn minutes(&self) -> f64 {
        f64::from(self.duration) / 60.0
    }
}

/// Emitted once when a running countdown reaches zero
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionCompleted {
    pub mode: SessionType,
    pub record: SessionRecord,
}

// ============================================================================
// Timer State
// ============================================================================

/// The one countdown the engine drives
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerState {
    pub mode: SessionType,
    pub time_remaining: u32,
    pub is_active: bool,
    /// Epoch milliseconds of the last (re)start; present while active
    pub start_time: Option<i64>,
    /// Remaining time captured at the last (re)start, the elapsed baseline
    pub initial_duration: u32,
}

impl TimerState {
    /// An idle session at the full duration for `mode`
    pub fn idle(mode: SessionType, settings: &Settings) -> Self {
        let duration = settings.duration_for(mode);
        Self {
            mode,
            time_remaining: duration,
            is_active: false,
            start_time: None,
            initial_duration: duration,
        }
    }

    /// Seconds counted down since the last (re)start
    pub fn elapsed(&self) -> u32 {
        self.initial_duration.saturating_sub(self.time_remaining)
    }

    /// 0.0 .. 100.0 progress against the configured duration
    pub fn progress_pct(&self, settings: &Settings) -> f64 {
        let total = settings.duration_for(self.mode);
        if total == 0 {
            return 0.0;
        }
        let done = total.saturating_sub(self.time_remaining);
        (f64::from(done) / f64::from(total) * 100.0).clamp(0.0, 100.0)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle(SessionType::Work, &Settings::default())
    }
}

/// Render seconds as `MM:SS`; minutes are not wrapped into hours
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// Store Snapshot
// ============================================================================

/// Everything that survives a restart
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub current_session: TimerState,
    #[serde(default)]
    pub daily_progress: ProgressLedger,
}

impl StoreSnapshot {
    /// A fresh store seeded with the given settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            current_session: TimerState::idle(SessionType::Work, &settings),
            daily_progress: ProgressLedger::default(),
        }
    }
}

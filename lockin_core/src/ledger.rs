//! Progress ledger: completed sessions bucketed by local calendar day.
//!
//! Days are kept in the order they were first recorded. Within a day,
//! sessions are appended as they complete and never re-sorted.

use crate::SessionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All sessions credited to one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayProgress {
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub sessions: Vec<SessionRecord>,
}

impl DayProgress {
    /// Work sessions in this day, in append order
    pub fn work_sessions(&self) -> impl Iterator<Item = &SessionRecord> {
        self.sessions.iter().filter(|s| s.is_work())
    }

    pub fn work_minutes(&self) -> f64 {
        self.work_sessions().map(SessionRecord::minutes).sum()
    }
}

/// Per-day history of completed sessions
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct ProgressLedger {
    days: Vec<DayProgress>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` under `today`, creating the day entry on first use.
    ///
    /// `today` is the day the session was recorded, which can differ from
    /// the day it started.
    pub fn record_session(&mut self, record: SessionRecord, today: NaiveDate) {
        match self.days.iter_mut().find(|d| d.date == today) {
            Some(day) => day.sessions.push(record),
            None => self.days.push(DayProgress {
                date: today,
                sessions: vec![record],
            }),
        }

        tracing::debug!(
            "Recorded {} session of {}s on {}",
            record.session_type.as_str(),
            record.duration,
            today
        );
    }

    pub fn days(&self) -> &[DayProgress] {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayProgress> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of recorded sessions across all days
    pub fn session_count(&self) -> usize {
        self.days.iter().map(|d| d.sessions.len()).sum()
    }

    /// Minutes of work across every day
    pub fn total_work_minutes(&self) -> f64 {
        self.days.iter().map(DayProgress::work_minutes).sum()
    }

    /// Minutes of work on `date`; 0 when nothing was recorded
    pub fn work_minutes_on(&self, date: NaiveDate) -> f64 {
        self.day(date).map(DayProgress::work_minutes).unwrap_or(0.0)
    }

    /// Work sessions on `date`; empty when nothing was recorded
    pub fn work_sessions_on(&self, date: NaiveDate) -> Vec<SessionRecord> {
        self.day(date)
            .map(|d| d.work_sessions().copied().collect())
            .unwrap_or_default()
    }
}

//! Recent-history views over the progress ledger.
//!
//! Builds the rolling day window used by the heatmap. Everything here takes
//! `today` explicitly so results do not depend on the wall clock.

use crate::{Error, ProgressLedger, Result, SessionRecord};
use chrono::{Days, NaiveDate};

/// Default heatmap window
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Longest heatmap window, one leap year
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Accept a window of 1 ..= [`MAX_WINDOW_DAYS`] days
pub fn validate_window(days: u32) -> Result<u32> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(Error::Validation(format!(
            "heatmap window must be between 1 and {} days, got {}",
            MAX_WINDOW_DAYS, days
        )));
    }
    Ok(days)
}

/// Heatmap shade for a day's work minutes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl Intensity {
    /// Bucket work minutes: 0, <30, <60, <120, and anything above
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes <= 0.0 {
            Intensity::None
        } else if minutes < 30.0 {
            Intensity::Low
        } else if minutes < 60.0 {
            Intensity::Medium
        } else if minutes < 120.0 {
            Intensity::High
        } else {
            Intensity::Max
        }
    }

    /// Single-character glyph for terminal rendering
    pub fn glyph(self) -> char {
        match self {
            Intensity::None => '·',
            Intensity::Low => '░',
            Intensity::Medium => '▒',
            Intensity::High => '▓',
            Intensity::Max => '█',
        }
    }
}

/// One day in the heatmap window
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub minutes: f64,
    pub intensity: Intensity,
    pub sessions: Vec<SessionRecord>,
}

/// The last `days` days ending at `today`, oldest first
pub fn heatmap(ledger: &ProgressLedger, today: NaiveDate, days: u32) -> Vec<HeatmapCell> {
    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| {
            let minutes = ledger.work_minutes_on(date);
            HeatmapCell {
                date,
                minutes,
                intensity: Intensity::from_minutes(minutes),
                sessions: ledger.work_sessions_on(date),
            }
        })
        .collect()
}

/// Minutes rendered as hours with one decimal, e.g. `"1.5"`
pub fn format_hours(minutes: f64) -> String {
    format!("{:.1}", minutes / 60.0)
}

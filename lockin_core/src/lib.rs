#![forbid(unsafe_code)]

//! Core domain model and business logic for the LockIn focus timer.
//!
//! This crate provides:
//! - Domain types (modes, settings, session records, timer state)
//! - Session engine (work/rest countdown state machine)
//! - Progress ledger and heatmap history
//! - Persistence (store snapshot, CSV export)
//! - Clock driver and completion notification

pub mod types;
pub mod error;
pub mod clock;
pub mod config;
pub mod logging;
pub mod ledger;
pub mod history;
pub mod engine;
pub mod driver;
pub mod notify;
pub mod state;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use ledger::{DayProgress, ProgressLedger};
pub use history::{format_hours, heatmap, validate_window, HeatmapCell, Intensity};
pub use engine::SessionEngine;
pub use driver::{run_session, DriveEvent, DriveOutcome, IntervalTicker, Ticker};
pub use notify::{completion_message, Notifier, SilentNotifier, TerminalNotifier};
pub use export::export_csv;
pub use state::StateLock;

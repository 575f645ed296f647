//! Completion alerts.
//!
//! Notification is best-effort: callers log a failed notify and carry on.

use crate::{Result, SessionCompleted, SessionType};
use std::io::Write;

/// Sink for completion alerts
pub trait Notifier {
    fn notify(&mut self, completed: &SessionCompleted) -> Result<()>;
}

/// Message shown when a session of `mode` finishes
pub fn completion_message(mode: SessionType) -> String {
    format!("{} session complete!", mode)
}

/// Writes the alert to a terminal stream, optionally ringing the bell
pub struct TerminalNotifier<W: Write> {
    out: W,
    bell: bool,
}

impl TerminalNotifier<std::io::Stdout> {
    pub fn stdout(bell: bool) -> Self {
        Self::new(std::io::stdout(), bell)
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W, bell: bool) -> Self {
        Self { out, bell }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&mut self, completed: &SessionCompleted) -> Result<()> {
        if self.bell {
            self.out.write_all(b"\x07")?;
        }
        writeln!(self.out, "{}", completion_message(completed.mode))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Drops every alert
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&mut self, completed: &SessionCompleted) -> Result<()> {
        tracing::debug!("Notifications disabled, skipping {} alert", completed.mode);
        Ok(())
    }
}

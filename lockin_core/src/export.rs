//! CSV export of the progress ledger.
//!
//! One row per recorded session, in ledger order, synced to disk before
//! returning.

use crate::{ProgressLedger, Result};
use chrono::{Local, TimeZone};
use std::fs::File;
use std::path::Path;

/// Column names, matching the serialized field order of [`CsvRow`]
const HEADERS: [&str; 5] = ["date", "type", "duration_seconds", "timestamp_ms", "completed_at"];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    #[serde(rename = "type")]
    session_type: &'static str,
    duration_seconds: u32,
    timestamp_ms: i64,
    completed_at: Option<String>,
}

/// Write every session in `ledger` to `path`, replacing the file.
///
/// Returns the number of rows written.
pub fn export_csv(ledger: &ProgressLedger, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let mut count = 0;
    for day in ledger.days() {
        for session in &day.sessions {
            writer.serialize(CsvRow {
                date: day.date.format("%Y-%m-%d").to_string(),
                session_type: session.session_type.as_str(),
                duration_seconds: session.duration,
                timestamp_ms: session.timestamp,
                completed_at: Local
                    .timestamp_millis_opt(session.timestamp)
                    .single()
                    .map(|t| t.to_rfc3339()),
            })?;
            count += 1;
        }
    }

    // serialize() only emits headers alongside the first row
    if count == 0 {
        writer.write_record(HEADERS)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", count, path);
    Ok(count)
}

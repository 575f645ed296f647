//! Error types for the lockin_core library.
//!
//! The session engine and progress ledger never fail; these errors come from
//! the boundaries around them (files, parsing, settings validation).

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lockin_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input at the settings boundary
    #[error("Invalid input: {0}")]
    Validation(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Another process holds the state lock
    #[error("State at {0:?} is in use by another lockin process (a running `lockin start`); press Ctrl-C there first")]
    Locked(PathBuf),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

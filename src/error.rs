use std::path::PathBuf;

use chrono::NaiveDate;

/// A form field that is missing or malformed.
///
/// Validation failures keep a medication from being created at all; there is
/// no partially-added medication.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: String },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),

    #[error("invalid time '{0}' (use 'morning', 'noon', '8:00', '14:30' or an hour)")]
    InvalidTime(String),

    #[error("interval of {0} is too large")]
    IntervalTooLarge(String),

    #[error("{days} days from {from} is past the supported date range")]
    DateOutOfRange { from: NaiveDate, days: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize medication data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

//! Error types for the timeline engine.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::EventId;

/// Errors surfaced by timeline operations.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid date range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;

//! SSE event types and definitions

use thiserror::Error;

use crate::models::{Job, StatusSummary};

/// One complete `{event, data}` block from the stream, before JSON decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSseEvent {
    /// Event name from the `event:` line (`message` when absent)
    pub event: String,
    /// Data lines joined with `\n`
    pub data: String,
}

/// Typed events from the job stream endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A job was created or changed
    JobUpdate(Job),
    /// Aggregate snapshot replacing the previous one
    StatusSummary(StatusSummary),
    /// Error reported by the server inside the stream
    Error {
        error: String,
        details: Option<String>,
    },
}

impl JobEvent {
    /// Returns the event type name as a string for debugging purposes.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            JobEvent::JobUpdate(_) => "job_update",
            JobEvent::StatusSummary(_) => "status_summary",
            JobEvent::Error { .. } => "error",
        }
    }
}

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: job_update")
    Event(String),
    /// Data payload (e.g., "data: {\"job_id\": \"j-1\"}")
    Data(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
}

/// Errors that can occur during SSE parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseParseError {
    /// Invalid JSON in data payload
    #[error("Invalid JSON for event '{event_type}': {message}")]
    InvalidJson { event_type: String, message: String },
    /// Missing data for event
    #[error("Missing data for event type: {event_type}")]
    MissingData { event_type: String },
}

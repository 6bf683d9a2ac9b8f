//! SSE stream parsing logic
//!
//! Contains line classification, the stateful [`SseParser`] that accumulates
//! lines into raw events, the byte-level [`SseDecoder`] fed from HTTP body
//! chunks, and typed decoding of job stream events.

mod decoder;

use serde::de::DeserializeOwned;

use crate::sse::events::{JobEvent, RawSseEvent, SseLine, SseParseError};
use crate::sse::payloads::ErrorPayload;

pub use decoder::SseDecoder;

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim().to_string());
    }

    // `id:`, `retry:` and unknown fields carry nothing we use
    SseLine::Comment(line.to_string())
}

fn decode<T: DeserializeOwned>(event_type: &str, data: &str) -> Result<T, SseParseError> {
    if data.is_empty() {
        return Err(SseParseError::MissingData {
            event_type: event_type.to_string(),
        });
    }
    serde_json::from_str(data).map_err(|e| SseParseError::InvalidJson {
        event_type: event_type.to_string(),
        message: e.to_string(),
    })
}

/// Decode a raw event into a typed job stream event.
///
/// Returns `Ok(None)` for event names this client does not consume
/// (pings, heartbeats, anything new on the server side).
pub fn parse_job_event(raw: &RawSseEvent) -> Result<Option<JobEvent>, SseParseError> {
    match raw.event.as_str() {
        "job_update" => decode(&raw.event, &raw.data).map(|job| Some(JobEvent::JobUpdate(job))),
        "status_summary" => {
            decode(&raw.event, &raw.data).map(|summary| Some(JobEvent::StatusSummary(summary)))
        }
        "error" => {
            let payload: ErrorPayload = decode(&raw.event, &raw.data)?;
            Ok(Some(JobEvent::Error {
                error: payload.error,
                details: payload.details,
            }))
        }
        _ => Ok(None),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete raw events
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line (without its trailing newline) to the parser.
    ///
    /// Returns `Some(event)` when the line completes an event.
    pub fn feed_line(&mut self, line: &str) -> Option<RawSseEvent> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                None
            }
            SseLine::Empty => self.try_emit_event(),
            SseLine::Comment(_) => None,
        }
    }

    fn try_emit_event(&mut self) -> Option<RawSseEvent> {
        if self.current_event_type.is_none() && self.data_buffer.is_empty() {
            return None;
        }

        let mut event = self.current_event_type.take();
        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        // Some servers put the event name inside the JSON body instead
        if event.is_none() && !data.is_empty() {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&data) {
                if let Some(t) = json.get("type").and_then(|v| v.as_str()) {
                    event = Some(t.to_string());
                }
            }
        }

        Some(RawSseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

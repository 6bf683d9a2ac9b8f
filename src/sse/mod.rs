//! SSE (Server-Sent Events) stream parser
//!
//! Parses the event-stream format served by the job stream endpoint.
//! SSE format consists of:
//! - `event: <type>` - event type line
//! - `data: <json>` - data payload line
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments / keep-alives (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (RawSseEvent, JobEvent, SseLine, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Parsing logic (SseParser, SseDecoder, parse_sse_line, parse_job_event)

mod events;
mod parser;
mod payloads;

pub use events::{JobEvent, RawSseEvent, SseLine, SseParseError};
pub use parser::{parse_job_event, parse_sse_line, SseDecoder, SseParser};

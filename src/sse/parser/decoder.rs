//! Byte-level framing for SSE bodies.

use super::SseParser;
use crate::sse::events::RawSseEvent;

/// Splits arbitrarily chunked body bytes into lines and feeds them to an
/// [`SseParser`].
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// sequences split across chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    parser: SseParser,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, returning every event it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawSseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(event) = self.parser.feed_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }
        events
    }

    /// Flush at end of stream: an unterminated last line still completes
    /// the pending event.
    pub fn finish(&mut self) -> Vec<RawSseEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            if let Some(event) = self.parser.feed_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }
        if let Some(event) = self.parser.feed_line("") {
            events.push(event);
        }
        events
    }
}

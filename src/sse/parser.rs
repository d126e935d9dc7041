//! SSE line parsing logic
//!
//! Contains the stateful SseParser for accumulating lines and emitting
//! messages, as well as line classification.

use crate::sse::events::{SseLine, SseMessage};

/// Strip the single optional space that follows a field colon.
fn field_value(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

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

    // Payloads keep their surrounding whitespace; only the separator space goes
    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(field_value(rest).to_string());
    }

    // Unknown line format - treat as comment
    SseLine::Comment(line.to_string())
}

/// Stateful SSE parser that accumulates lines and emits complete messages
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line (without its trailing newline) to the parser.
    ///
    /// Returns `Some(message)` when the line completes a message.
    pub fn feed_line(&mut self, line: &str) -> Option<SseMessage> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                None
            }
            SseLine::Empty => self.try_emit(),
            SseLine::Comment(_) => None,
        }
    }

    /// Data accumulated for a message whose blank line never arrived.
    ///
    /// Called when the underlying connection closes. Clears the parser.
    pub fn take_pending(&mut self) -> Option<String> {
        self.current_event_type = None;
        if self.data_buffer.is_empty() {
            return None;
        }
        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();
        Some(data)
    }

    fn try_emit(&mut self) -> Option<SseMessage> {
        let event = self.current_event_type.take();

        // A blank line with no data dispatches nothing
        if self.data_buffer.is_empty() {
            return None;
        }

        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();
        Some(SseMessage { event, data })
    }
}

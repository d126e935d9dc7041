//! SSE line and message types

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: content")
    Event(String),
    /// Data payload (e.g., "data: \"hello\"")
    Data(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
}

/// A complete SSE message, dispatched when its terminating blank line arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// Event type, if an `event:` line preceded the data
    pub event: Option<String>,
    /// Data lines joined with `\n`
    pub data: String,
}

impl SseMessage {
    /// Create a message with no event type.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }
}

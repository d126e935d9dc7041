//! SSE (Server-Sent Events) stream parser
//!
//! Parses the line-oriented SSE format used both by the transport server's
//! stream endpoint and by OpenAI-compatible generation backends.
//! SSE format consists of:
//! - `event: <type>` - event type line
//! - `data: <payload>` - data payload line
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Parsed line and message types (SseLine, SseMessage)
//! - `parser` - Line classification and the stateful SseParser
//! - `decoder` - Byte-chunk decoding on top of the parser

mod decoder;
mod events;
mod parser;

pub use decoder::SseDecoder;
pub use events::{SseLine, SseMessage};
pub use parser::{parse_sse_line, SseParser};

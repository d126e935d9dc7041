//! Event frame codec.
//!
//! A frame carries exactly one fragment:
//!
//! ```text
//! data: "<json-encoded fragment>"\n\n
//! ```
//!
//! The diagnostic frame written when a producer fails is plain text and is
//! not terminated by a blank line:
//!
//! ```text
//! data: An error occurred: <reason>
//! ```
//!
//! This module also holds the display derivation used by the client, which
//! works on the raw concatenation of frame payloads.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ClientError;

/// Marker that starts every frame line.
pub const DATA_PREFIX: &str = "data: ";

/// Terminator that ends a content frame.
pub const FRAME_TERMINATOR: &str = "\n\n";

static LEADING_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^""#).expect("Invalid leading quote regex"));
static DOUBLED_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""""#).expect("Invalid doubled quote regex"));
static TRAILING_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""$"#).expect("Invalid trailing quote regex"));

/// Encode one fragment as a content frame.
///
/// The fragment is JSON-quoted so quotes, newlines and control characters
/// survive the line-oriented framing.
pub fn encode_frame(fragment: &str) -> String {
    let quoted = serde_json::Value::String(fragment.to_owned()).to_string();
    format!("{}{}{}", DATA_PREFIX, quoted, FRAME_TERMINATOR)
}

/// Build the diagnostic frame for a failed stream.
///
/// Line breaks in `notice` are flattened so the frame stays on one line.
pub fn diagnostic_frame(notice: &str) -> String {
    let line: String = notice
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{}{}", DATA_PREFIX, line)
}

/// Human-readable notice sent to clients when generation fails.
pub fn diagnostic_notice(err: &impl std::fmt::Display) -> String {
    format!("An error occurred: {}", err)
}

/// Decode the payload of a content frame back into the fragment text.
pub fn decode_payload(payload: &str) -> Result<String, ClientError> {
    serde_json::from_str::<String>(payload).map_err(|_| ClientError::MalformedFrame {
        payload: payload.to_string(),
    })
}

/// Derive the display string from the raw concatenated frame payloads.
///
/// Strips one leading quote, removes the doubled quotes left where two
/// quoted payloads meet, strips one trailing quote, then trims whitespace.
/// Escape sequences inside the payloads are left as they are.
pub fn clean_display(raw: &str) -> String {
    let without_leading = LEADING_QUOTE.replace(raw, "");
    let without_joins = DOUBLED_QUOTES.replace_all(&without_leading, "");
    let without_trailing = TRAILING_QUOTE.replace(&without_joins, "");
    without_trailing.trim().to_string()
}

//! Byte-level SSE decoding.
//!
//! Network bodies arrive in arbitrary chunks: a line, or a multi-byte UTF-8
//! character, may be split across two of them. `SseDecoder` buffers raw bytes
//! until a full line is available and hands complete lines to [`SseParser`].

use crate::sse::{SseMessage, SseParser};

#[derive(Debug, Default)]
pub struct SseDecoder {
    parser: SseParser,
    pending: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes, returning every message it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.pending.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(newline_pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(message) = self.parser.feed_line(line.trim_end_matches('\r')) {
                messages.push(message);
            }
        }
        messages
    }

    /// Finish decoding at end of stream.
    ///
    /// Returns the data of a message that was never terminated by a blank
    /// line, including a final line that had no newline at all.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            // A complete message here means the body ended right after its blank line
            if let Some(message) = self.parser.feed_line(line.trim_end_matches('\r')) {
                return Some(message.data);
            }
        }
        self.parser.take_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_splits_frames() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.push(b"data: \"a\"\n\ndata: \"b\"\n\n");
        assert_eq!(
            messages,
            vec![SseMessage::data("\"a\""), SseMessage::data("\"b\"")]
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_decoder_handles_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: \"Hel").is_empty());
        assert!(decoder.push(b"lo\"\n").is_empty());
        assert_eq!(decoder.push(b"\n"), vec![SseMessage::data("\"Hello\"")]);
    }

    #[test]
    fn test_decoder_handles_split_utf8() {
        let bytes = "data: \"héllo\"\n\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(
            decoder.push(&bytes[split..]),
            vec![SseMessage::data("\"héllo\"")]
        );
    }

    #[test]
    fn test_decoder_accepts_crlf() {
        let mut decoder = SseDecoder::new();
        assert_eq!(
            decoder.push(b"data: \"x\"\r\n\r\n"),
            vec![SseMessage::data("\"x\"")]
        );
    }

    #[test]
    fn test_finish_returns_unterminated_line() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: \"a\"\n\ndata: An error occurred: boom");
        assert_eq!(
            decoder.finish(),
            Some("An error occurred: boom".to_string())
        );
    }

    #[test]
    fn test_finish_returns_data_missing_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: partial\n").is_empty());
        assert_eq!(decoder.finish(), Some("partial".to_string()));
    }
}

//! Client session state machine.
//!
//! ```text
//! Idle -> Connecting -> Streaming -> Closed(Clean | Error)
//!              \______________________^
//! ```
//!
//! The session owns two buffers. `raw` is the concatenation of frame
//! payloads exactly as received, which the display string is derived from.
//! `text` is the concatenation of the decoded fragments.

use std::time::Duration;
use tokio::time::Instant;

use crate::error::ClientError;
use crate::frame::{clean_display, decode_payload};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// The server finished the stream, or the client closed it
    Clean,
    /// The subscription failed
    Error(ClientError),
}

impl Closure {
    pub fn is_error(&self) -> bool {
        matches!(self, Closure::Error(_))
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Closed(Closure),
}

/// What a caller should do after a frame or closure was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A fragment arrived; redraw `display`.
    Fragment {
        display: String,
        /// Set only on the session's first fragment
        first_fragment_latency: Option<Duration>,
    },
    /// The session reached a terminal state.
    Closed(Closure),
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    started_at: Option<Instant>,
    first_fragment_latency: Option<Duration>,
    raw: String,
    text: String,
    frames: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new subscription: record the start time and clear the buffers.
    pub fn start(&mut self) {
        self.state = SessionState::Connecting;
        self.started_at = Some(Instant::now());
        self.first_fragment_latency = None;
        self.raw.clear();
        self.text.clear();
        self.frames = 0;
    }

    /// Apply one frame payload.
    ///
    /// Fails with [`ClientError::MalformedFrame`] when the payload is not a
    /// JSON string; the buffers are left untouched in that case.
    pub fn on_frame(&mut self, payload: &str) -> Result<SessionUpdate, ClientError> {
        let fragment = decode_payload(payload)?;

        let mut first_fragment_latency = None;
        if self.text.is_empty() && !fragment.is_empty() && self.first_fragment_latency.is_none() {
            let latency = self
                .started_at
                .map(|started| started.elapsed())
                .unwrap_or_default();
            self.first_fragment_latency = Some(latency);
            first_fragment_latency = Some(latency);
        }

        self.raw.push_str(payload);
        self.text.push_str(&fragment);
        self.frames += 1;
        self.state = SessionState::Streaming;

        Ok(SessionUpdate::Fragment {
            display: self.display(),
            first_fragment_latency,
        })
    }

    /// Move to a terminal state. A session that is already closed stays as it was.
    pub fn close(&mut self, closure: Closure) -> Closure {
        match &self.state {
            SessionState::Closed(existing) => existing.clone(),
            _ => {
                self.state = SessionState::Closed(closure.clone());
                closure
            }
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Terminal state, once reached
    pub fn closure(&self) -> Option<&Closure> {
        match &self.state {
            SessionState::Closed(closure) => Some(closure),
            _ => None,
        }
    }

    /// Display string derived from the raw payload buffer
    pub fn display(&self) -> String {
        clean_display(&self.raw)
    }

    /// Raw concatenation of frame payloads
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Concatenation of decoded fragments
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Elapsed time from start to the first fragment, once it arrived
    pub fn first_fragment_latency(&self) -> Option<Duration> {
        self.first_fragment_latency
    }

    /// Number of frames applied
    pub fn frames(&self) -> usize {
        self.frames
    }
}

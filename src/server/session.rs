//! Stream sessions: draining one producer sequence onto one response body.
//!
//! A session exists for exactly as long as its frame stream. The stream is
//! pulled by the HTTP layer one frame at a time, so the next fragment is only
//! requested after the previous frame has been handed to the connection.
//! When the client goes away the body is dropped, which drops the fragment
//! sequence and with it the producer's stream.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use tokio::time::Instant;
use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::frame::{diagnostic_frame, diagnostic_notice, encode_frame};
use crate::producer::FragmentStream;

type FrameStep = Option<(Result<Bytes, Infallible>, Option<(StreamSession, FragmentStream)>)>;

/// One client's stream request.
#[derive(Debug)]
pub struct StreamSession {
    /// Identifier used in logs
    pub id: Uuid,
    /// Query exactly as received
    pub query: String,
    span: Span,
    started: Instant,
    frames: usize,
    finished: bool,
}

impl StreamSession {
    pub fn new(query: String) -> Self {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("stream_session", session_id = %id);
        span.in_scope(|| tracing::info!(query_len = query.len(), "Stream session opened"));

        Self {
            id,
            query,
            span,
            started: Instant::now(),
            frames: 0,
            finished: false,
        }
    }

    /// Turn the fragment sequence into response body chunks, one frame each.
    ///
    /// Produces one content frame per fragment in yield order. On producer
    /// failure a single diagnostic frame is the last chunk. The body ends
    /// (and the connection closes) when the sequence does.
    pub fn into_frames(
        self,
        fragments: FragmentStream,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
        stream::unfold(Some((self, fragments)), |state| async move {
            let (session, fragments) = state?;
            let span = session.span.clone();
            session.next_frame(fragments).instrument(span).await
        })
    }

    async fn next_frame(mut self, mut fragments: FragmentStream) -> FrameStep {
        match fragments.next().await {
            Some(Ok(fragment)) => {
                self.frames += 1;
                tracing::trace!(frame = self.frames, len = fragment.len(), "Writing frame");
                let frame = Bytes::from(encode_frame(&fragment));
                Some((Ok(frame), Some((self, fragments))))
            }
            Some(Err(e)) => {
                tracing::warn!(
                    frames = self.frames,
                    code = e.error_code(),
                    error = %e,
                    "Producer failed, closing stream with diagnostic"
                );
                self.finished = true;
                let frame = Bytes::from(diagnostic_frame(&diagnostic_notice(&e)));
                Some((Ok(frame), None))
            }
            None => {
                self.finished = true;
                tracing::info!(
                    frames = self.frames,
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "Stream complete"
                );
                None
            }
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if !self.finished {
            let _enter = self.span.enter();
            tracing::info!(frames = self.frames, "Client went away, producer released");
        }
    }
}

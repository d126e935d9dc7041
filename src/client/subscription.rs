//! Subscription handle: a session bound to its frame source.

use futures::StreamExt;

use super::session::{Closure, Session, SessionState, SessionUpdate};
use super::source::{FrameSource, SourceFrame};
use crate::error::ClientError;
use crate::traits::Renderer;

/// A live (or finished) subscription to a frame source.
///
/// Pull updates with [`next`](Subscription::next) or drive the whole session
/// into a [`Renderer`] with [`run`](Subscription::run). Dropping the
/// subscription, or calling [`close`](Subscription::close), drops the source
/// and with it the connection.
pub struct Subscription {
    session: Session,
    source: Option<FrameSource>,
}

impl Subscription {
    /// Start a session on `source`. The start time is recorded here.
    pub fn new(source: FrameSource) -> Self {
        let mut session = Session::new();
        session.start();
        Self {
            session,
            source: Some(source),
        }
    }

    /// Wait for the next update.
    ///
    /// Returns `None` once the subscription is closed and its closure has
    /// been reported.
    pub async fn next(&mut self) -> Option<SessionUpdate> {
        let source = self.source.as_mut()?;

        let closure = match source.next().await {
            Some(Ok(SourceFrame::Data(payload))) => match self.session.on_frame(&payload) {
                Ok(update) => return Some(update),
                Err(e) => Closure::Error(e),
            },
            Some(Ok(SourceFrame::Unterminated(message))) => {
                Closure::Error(ClientError::Diagnostic { message })
            }
            Some(Err(e)) => Closure::Error(e),
            None => Closure::Clean,
        };

        Some(SessionUpdate::Closed(self.terminate(closure)))
    }

    /// Close the subscription. Closing an already closed subscription does nothing.
    pub fn close(&mut self) {
        if self.source.is_some() {
            tracing::debug!(frames = self.session.frames(), "Subscription closed by client");
            self.terminate(Closure::Clean);
        }
    }

    fn terminate(&mut self, closure: Closure) -> Closure {
        self.source = None;
        let closure = self.session.close(closure);
        match &closure {
            Closure::Clean => tracing::debug!(frames = self.session.frames(), "Stream closed"),
            Closure::Error(e) => {
                tracing::debug!(code = e.error_code(), error = %e, "Stream closed with error")
            }
        }
        closure
    }

    /// Drive the subscription to its end, rendering after every fragment.
    pub async fn run<R: Renderer + ?Sized>(mut self, renderer: &mut R) -> Closure {
        while let Some(update) = self.next().await {
            match update {
                SessionUpdate::Fragment {
                    display,
                    first_fragment_latency,
                } => {
                    if let Some(latency) = first_fragment_latency {
                        renderer.first_fragment(latency);
                    }
                    renderer.render(&display);
                }
                SessionUpdate::Closed(closure) => {
                    renderer.closed(&closure);
                    return closure;
                }
            }
        }
        self.session.closure().cloned().unwrap_or(Closure::Clean)
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

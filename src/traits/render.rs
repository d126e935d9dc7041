//! Rendering trait abstraction for client sessions.

use std::time::Duration;

use crate::client::Closure;

/// Sink for a subscription's output.
///
/// `render` receives the full display string after every frame; there is no
/// incremental diffing.
pub trait Renderer {
    /// Redraw the whole display string.
    fn render(&mut self, display: &str);

    /// Called once per session, when the first fragment arrives.
    fn first_fragment(&mut self, _latency: Duration) {}

    /// Called once when the session reaches a terminal state.
    fn closed(&mut self, _closure: &Closure) {}
}

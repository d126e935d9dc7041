//! Recording renderer for testing.

use std::time::Duration;

use crate::client::Closure;
use crate::traits::Renderer;

/// Renderer that keeps every call for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    /// Every display string rendered, in order
    pub renders: Vec<String>,
    /// Latencies reported through `first_fragment`
    pub first_fragment_latencies: Vec<Duration>,
    /// Terminal state, once reached
    pub closure: Option<Closure>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered display string
    pub fn last_render(&self) -> Option<&str> {
        self.renders.last().map(String::as_str)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, display: &str) {
        self.renders.push(display.to_string());
    }

    fn first_fragment(&mut self, latency: Duration) {
        self.first_fragment_latencies.push(latency);
    }

    fn closed(&mut self, closure: &Closure) {
        self.closure = Some(closure.clone());
    }
}

//! Terminal renderer adapter.
//!
//! Redraws the session's display string in place: the cursor position is
//! saved before the first render and every later render restores it, clears
//! everything below and prints the full display string again.

use crossterm::{
    cursor, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Stdout, Write};

use crate::client::Closure;
use crate::traits::Renderer;

pub struct TerminalRenderer<W: Write> {
    out: W,
    anchored: bool,
}

impl TerminalRenderer<Stdout> {
    /// Render to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            anchored: false,
        }
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, display: &str) -> io::Result<()> {
        if self.anchored {
            queue!(
                self.out,
                cursor::RestorePosition,
                Clear(ClearType::FromCursorDown)
            )?;
        } else {
            queue!(self.out, cursor::SavePosition)?;
            self.anchored = true;
        }
        queue!(self.out, Print(display))?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, display: &str) {
        if let Err(e) = self.draw(display) {
            tracing::warn!(error = %e, "Failed to draw display string");
        }
    }

    fn closed(&mut self, _closure: &Closure) {
        if let Err(e) = writeln!(self.out).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to finish terminal output");
        }
    }
}

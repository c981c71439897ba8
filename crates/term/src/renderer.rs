//! TerminalRenderer: shows a [`TerminalHost`] on the real terminal.
//!
//! The host decides whether anything changed (it is dirty after every
//! committed patch batch). When it is, the renderer repaints into a back
//! screen and rewrites only the rows that differ from what the terminal
//! already shows. A resize or [`TerminalRenderer::invalidate`] forces a
//! full clear and redraw.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor, execute,
    style::{Attribute, Color, Colors, Print, ResetColor, SetAttribute, SetColors},
    terminal, QueueableCommand,
};

use crate::host::TerminalHost;
use crate::screen::{Ink, Rgb, Screen, Weight};
use crate::view::Viewport;

pub struct TerminalRenderer {
    out: io::Stdout,
    /// What the terminal currently shows
    front: Screen,
    /// Scratch screen the host paints into
    back: Screen,
    /// False until `front` reflects the terminal contents
    in_sync: bool,
    bytes: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            front: Screen::default(),
            back: Screen::default(),
            in_sync: false,
            bytes: Vec::new(),
        }
    }

    /// Raw mode on the alternate screen
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            terminal::DisableLineWrap,
            cursor::Hide
        )?;
        self.in_sync = false;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        execute!(
            self.out,
            ResetColor,
            SetAttribute(Attribute::Reset),
            cursor::Show,
            terminal::EnableLineWrap,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Forget what the terminal shows; the next frame is a full redraw.
    pub fn invalidate(&mut self) {
        self.in_sync = false;
    }

    /// Repaint and flush the host if it changed. Returns the number of rows
    /// written.
    pub fn present(&mut self, host: &mut TerminalHost, viewport: Viewport) -> Result<usize> {
        let rows = self.compose(host, viewport)?;
        if rows > 0 {
            self.out.write_all(&self.bytes)?;
            self.out.flush()?;
        }
        Ok(rows)
    }

    /// Build the next frame into `self.bytes` without writing it
    fn compose(&mut self, host: &mut TerminalHost, viewport: Viewport) -> Result<usize> {
        self.bytes.clear();
        if self.front.size() != (viewport.width, viewport.height) {
            self.in_sync = false;
        }
        if !self.in_sync {
            host.invalidate();
        }
        if !host.paint(viewport, &mut self.back) {
            return Ok(0);
        }

        let shown = self.in_sync.then_some(&self.front);
        let rows = encode_rows(shown, &self.back, &mut self.bytes)?;

        std::mem::swap(&mut self.front, &mut self.back);
        self.in_sync = true;
        Ok(rows)
    }
}

/// Encode every row of `next` that differs from `shown` into `out`. Without
/// a `shown` screen the terminal is cleared and every row is written.
pub fn encode_rows(shown: Option<&Screen>, next: &Screen, out: &mut Vec<u8>) -> Result<usize> {
    let shown = shown.filter(|screen| screen.size() == next.size());
    if shown.is_none() {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
    }

    let (_, height) = next.size();
    let mut rows = 0;
    for y in 0..height {
        if shown.is_some_and(|screen| screen.row_matches(next, y)) {
            continue;
        }
        for span in next.spans(y) {
            out.queue(cursor::MoveTo(span.x, y))?;
            queue_ink(out, span.ink)?;
            out.queue(Print(&span.text))?;
        }
        rows += 1;
    }

    if rows > 0 {
        out.queue(SetAttribute(Attribute::Reset))?;
        out.queue(ResetColor)?;
    }
    Ok(rows)
}

fn queue_ink(out: &mut Vec<u8>, ink: Ink) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetColors(Colors::new(color(ink.fg), color(ink.bg))))?;
    match ink.weight {
        Weight::Normal => {}
        Weight::Bold => {
            out.queue(SetAttribute(Attribute::Bold))?;
        }
        Weight::Dim => {
            out.queue(SetAttribute(Attribute::Dim))?;
        }
    }
    Ok(())
}

fn color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

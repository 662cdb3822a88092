//! Crossterm terminal backend.
//!
//! The [`Driver`] owns a buffered stdout writer and the color-pair
//! palette. It translates [`Attr`]s into crossterm style commands,
//! applies [`CellUpdate`] batches, and reads keys either blocking or with
//! a bounded timeout (the "tick" read used by live-updating widgets).
//! This is the toolkit's only fallible seam; everything above it reports
//! failure as absence.

use std::collections::HashMap;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::{
        available_color_count, Attribute, Color, Print, ResetColor, SetAttribute,
        SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use thiserror::Error;

use super::surface::CellUpdate;
use crate::event::KeyEvent;
use crate::markup::{Attr, StyleFlags};

// ---------------------------------------------------------------------------
// DriverError
// ---------------------------------------------------------------------------

/// Terminal backend failure. Reading from or writing to a dead terminal
/// is the one condition this toolkit treats as unrecoverable.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Color-pair definitions: pair index to (foreground, background).
///
/// Pair 0 is reserved for the terminal default and cannot be redefined.
/// Valid indexes are 1 to 99, the range markup pair markers can name.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    pairs: HashMap<u8, (Color, Color)>,
}

impl Palette {
    /// Create an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a color pair. Returns false (and does nothing) for pair 0
    /// and for indexes above 99.
    pub fn define_pair(&mut self, index: u8, fg: Color, bg: Color) -> bool {
        if index == 0 || index > 99 {
            return false;
        }
        self.pairs.insert(index, (fg, bg));
        true
    }

    /// Look up a pair definition.
    pub fn pair(&self, index: u8) -> Option<(Color, Color)> {
        self.pairs.get(&index).copied()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal output/input backend using crossterm.
pub struct Driver {
    writer: BufWriter<Stdout>,
    palette: Palette,
    colors: bool,
}

impl Driver {
    /// Create a driver wrapping stdout, probing color support.
    pub fn new() -> Result<Self, DriverError> {
        Ok(Self {
            writer: BufWriter::new(io::stdout()),
            palette: Palette::new(),
            colors: available_color_count() >= 8,
        })
    }

    /// Whether the terminal can render color pairs.
    pub fn has_colors(&self) -> bool {
        self.colors
    }

    /// Define a color pair in the palette.
    pub fn define_pair(&mut self, index: u8, fg: Color, bg: Color) -> bool {
        self.palette.define_pair(index, fg, bg)
    }

    /// The current palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Enter the alternate screen, enable raw mode, clear, hide cursor.
    pub fn enter(&mut self) -> Result<(), DriverError> {
        execute!(self.writer, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.writer, Clear(ClearType::All), cursor::Hide)?;
        Ok(())
    }

    /// Restore the terminal: show cursor, leave raw mode and the
    /// alternate screen.
    pub fn leave(&mut self) -> Result<(), DriverError> {
        execute!(self.writer, cursor::Show)?;
        terminal::disable_raw_mode()?;
        execute!(self.writer, LeaveAlternateScreen)?;
        Ok(())
    }

    /// The terminal size (columns, rows).
    pub fn terminal_size() -> Result<(u16, u16), DriverError> {
        Ok(terminal::size()?)
    }

    /// Best-effort terminal restore over a fresh stdout handle, for
    /// unwind paths where no driver is reachable. Each step runs
    /// regardless of the others; errors are ignored.
    pub fn force_restore() {
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show);
        let _ = terminal::disable_raw_mode();
        let _ = execute!(out, LeaveAlternateScreen);
    }

    /// Move the terminal cursor.
    pub fn move_to(&mut self, x: u16, y: u16) -> Result<(), DriverError> {
        queue!(self.writer, cursor::MoveTo(x, y))?;
        Ok(())
    }

    pub fn show_cursor(&mut self) -> Result<(), DriverError> {
        queue!(self.writer, cursor::Show)?;
        Ok(())
    }

    pub fn hide_cursor(&mut self) -> Result<(), DriverError> {
        queue!(self.writer, cursor::Hide)?;
        Ok(())
    }

    /// Apply a batch of cell updates. Queued; call [`Driver::flush`] to
    /// present the frame.
    pub fn apply_updates(&mut self, updates: &[CellUpdate]) -> Result<(), DriverError> {
        for update in updates {
            queue!(self.writer, cursor::MoveTo(update.x, update.y))?;
            self.apply_attr(update.cell.attr)?;
            queue!(self.writer, Print(update.cell.ch))?;
            queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }

    /// Flush queued output to the terminal.
    pub fn flush(&mut self) -> Result<(), DriverError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Read one key.
    ///
    /// With `timeout` set, returns `Ok(None)` when it elapses without
    /// input — the tick a live-updating widget re-renders on. Without a
    /// timeout the call blocks until a key arrives. Key releases and
    /// non-key events are not keys.
    pub fn read_key(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>, DriverError> {
        loop {
            if let Some(limit) = timeout {
                if !event::poll(limit)? {
                    return Ok(None);
                }
            }
            match event::read()? {
                Event::Key(ke) if ke.kind != KeyEventKind::Release => {
                    return Ok(Some(KeyEvent::from(ke)));
                }
                _ => {
                    if timeout.is_some() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Queue the style commands for an attribute.
    ///
    /// STANDOUT renders as bold reverse video. A color pair on a
    /// monochrome terminal degrades to reverse video rather than failing.
    fn apply_attr(&mut self, attr: Attr) -> Result<(), DriverError> {
        let flags = attr.flags;
        if flags.contains(StyleFlags::BOLD) {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if flags.contains(StyleFlags::DIM) {
            queue!(self.writer, SetAttribute(Attribute::Dim))?;
        }
        if flags.contains(StyleFlags::BLINK) {
            queue!(self.writer, SetAttribute(Attribute::SlowBlink))?;
        }
        if flags.contains(StyleFlags::REVERSE) {
            queue!(self.writer, SetAttribute(Attribute::Reverse))?;
        }
        if flags.contains(StyleFlags::STANDOUT) {
            queue!(
                self.writer,
                SetAttribute(Attribute::Bold),
                SetAttribute(Attribute::Reverse)
            )?;
        }
        if flags.contains(StyleFlags::UNDERLINE) {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }

        if let Some(index) = attr.pair {
            if self.colors {
                if let Some((fg, bg)) = self.palette.pair(index) {
                    queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;
                }
            } else {
                queue!(self.writer, SetAttribute(Attribute::Reverse))?;
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

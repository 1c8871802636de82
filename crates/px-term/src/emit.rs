// SPDX-License-Identifier: MIT
//
// ANSI output assembly.
//
// A frame's worth of escape sequences is built up in a `Sink` and handed
// to the terminal in one write. Appending to a Vec cannot fail, so the
// whole emission API is infallible; I/O errors only exist at flush time.
//
// `CellWriter` sits on top and decides which sequences a cell actually
// needs, based on what the terminal is already displaying: cursor moves
// are dropped when the cursor is already in place, colors and attributes
// when they are already active.
//
// Coordinates are 0-based here and converted to the terminal's 1-based
// convention at the byte level.

use std::io::{self, Write};

use crate::cell::{Attr, Cell, CellColor};

// ─── Fixed sequences ─────────────────────────────────────────────────────────

/// Parameterless escape sequences, shared with `terminal.rs`.
pub mod seq {
    /// DECTCEM reset.
    pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
    /// DECTCEM set.
    pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
    /// ED 2 — erase the whole screen.
    pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
    /// SGR 0 — drop all colors and attributes.
    pub const SGR_RESET: &[u8] = b"\x1b[0m";
    /// DEC 2026 — start buffering output.
    pub const SYNC_ON: &[u8] = b"\x1b[?2026h";
    /// DEC 2026 — present the buffered frame.
    pub const SYNC_OFF: &[u8] = b"\x1b[?2026l";
    /// DEC 1049 — switch to the alternate screen.
    pub const ALT_SCREEN_ON: &[u8] = b"\x1b[?1049h";
    /// DEC 1049 — back to the primary screen.
    pub const ALT_SCREEN_OFF: &[u8] = b"\x1b[?1049l";
    /// Click + drag reporting in SGR encoding (DEC 1000, 1002, 1006).
    pub const MOUSE_ON: &[u8] = b"\x1b[?1000h\x1b[?1002h\x1b[?1006h";
    /// Mouse reporting off, reverse order of [`MOUSE_ON`].
    pub const MOUSE_OFF: &[u8] = b"\x1b[?1006l\x1b[?1002l\x1b[?1000l";
}

// ─── Sink ────────────────────────────────────────────────────────────────────

/// How many bytes a `Sink` starts out with. A typical incremental frame
/// is far smaller; a full-screen repaint of a colorful canvas is the
/// case this is sized for.
const SINK_CAPACITY: usize = 16 * 1024;

/// Byte buffer with ANSI emitters, flushed in a single `write()`.
pub struct Sink {
    bytes: Vec<u8>,
}

impl Sink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(SINK_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The accumulated bytes, without consuming them.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop everything accumulated so far; the allocation stays.
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append a pre-built sequence (or any raw bytes) verbatim.
    #[inline]
    pub fn raw(&mut self, sequence: &[u8]) {
        self.bytes.extend_from_slice(sequence);
    }

    /// CUP — place the cursor at 0-based `(x, y)`.
    pub fn cursor_to(&mut self, x: u16, y: u16) {
        self.raw(b"\x1b[");
        self.dec(u32::from(y) + 1);
        self.bytes.push(b';');
        self.dec(u32::from(x) + 1);
        self.bytes.push(b'H');
    }

    /// SGR foreground color.
    pub fn fg(&mut self, color: CellColor) {
        match color {
            CellColor::Default => self.raw(b"\x1b[39m"),
            CellColor::Rgb(r, g, b) => self.sgr_rgb(b"\x1b[38;2;", r, g, b),
        }
    }

    /// SGR background color.
    pub fn bg(&mut self, color: CellColor) {
        match color {
            CellColor::Default => self.raw(b"\x1b[49m"),
            CellColor::Rgb(r, g, b) => self.sgr_rgb(b"\x1b[48;2;", r, g, b),
        }
    }

    /// SGR attributes, batched into one sequence (`\x1b[1;7m` for
    /// bold + inverse). An empty set emits nothing.
    pub fn attrs(&mut self, attrs: Attr) {
        if attrs.is_empty() {
            return;
        }
        self.raw(b"\x1b[");
        let mut follow = false;
        for (flag, code) in [(Attr::BOLD, b'1'), (Attr::DIM, b'2'), (Attr::INVERSE, b'7')] {
            if attrs.contains(flag) {
                if follow {
                    self.bytes.push(b';');
                }
                self.bytes.push(code);
                follow = true;
            }
        }
        self.bytes.push(b'm');
    }

    /// Append a codepoint as UTF-8. Codepoint 0 (the wide-char
    /// continuation marker) and invalid scalar values become `?` —
    /// neither should ever reach the terminal.
    pub fn put_char(&mut self, codepoint: u32) {
        match char::from_u32(codepoint) {
            Some(ch) if codepoint != 0 => {
                let mut utf8 = [0u8; 4];
                self.raw(ch.encode_utf8(&mut utf8).as_bytes());
            }
            _ => self.bytes.push(b'?'),
        }
    }

    /// Write everything to stdout in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error when the write to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(&self.bytes)?;
        stdout.flush()?;
        self.bytes.clear();
        Ok(())
    }

    /// Write everything to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error when writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        w.write_all(&self.bytes)?;
        w.flush()?;
        self.bytes.clear();
        Ok(())
    }

    fn sgr_rgb(&mut self, prefix: &[u8], r: u8, g: u8, b: u8) {
        self.raw(prefix);
        self.dec(u32::from(r));
        self.bytes.push(b';');
        self.dec(u32::from(g));
        self.bytes.push(b';');
        self.dec(u32::from(b));
        self.bytes.push(b'm');
    }

    /// Append a decimal number without going through a formatter.
    #[allow(clippy::cast_possible_truncation)] // rest % 10 < 10.
    fn dec(&mut self, value: u32) {
        let mut digits = [0u8; 10];
        let mut at = digits.len();
        let mut rest = value;
        loop {
            at -= 1;
            digits[at] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        self.raw(&digits[at..]);
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Tracks what the terminal currently shows so repeated state is never
/// re-sent.
///
/// The tracked cursor is the position the *next* character lands on —
/// terminals advance after printing — so a left-to-right run of cells
/// needs exactly one cursor move. Colors are re-sent only on change.
/// An attribute change is preceded by SGR 0 (which also wipes color
/// tracking) unless no attributes were active.
///
/// Continuation cells directly after their wide character are skipped
/// outright: the terminal already painted both columns.
pub struct CellWriter {
    /// Where the next printed character will land, if known.
    cursor: Option<(u32, u32)>,
    fg: Option<CellColor>,
    bg: Option<CellColor>,
    attrs: Attr,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            fg: None,
            bg: None,
            attrs: Attr::empty(),
        }
    }

    /// Forget everything. Required after SGR 0 or a screen clear that
    /// this writer didn't emit itself.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Emit exactly the sequences this cell needs into `out`.
    pub fn render_cell(&mut self, out: &mut Sink, x: u16, y: u16, cell: &Cell) {
        let here = (u32::from(x), u32::from(y));

        if cell.is_continuation() && self.cursor == Some(here) {
            // Covered by the wide char one column to the left.
            self.cursor = Some((here.0 + 1, here.1));
            return;
        }

        if self.cursor != Some(here) {
            out.cursor_to(x, y);
        }

        self.style(out, cell);

        // An orphaned continuation still needs its background painted.
        let shown = if cell.is_continuation() {
            u32::from(b' ')
        } else {
            cell.ch
        };
        out.put_char(shown);

        self.cursor = Some((here.0 + 1, here.1));
    }

    fn style(&mut self, out: &mut Sink, cell: &Cell) {
        if cell.attrs != self.attrs {
            if !self.attrs.is_empty() {
                out.raw(seq::SGR_RESET);
                self.fg = None;
                self.bg = None;
            }
            out.attrs(cell.attrs);
            self.attrs = cell.attrs;
        }

        if self.fg != Some(cell.fg) {
            out.fg(cell.fg);
            self.fg = Some(cell.fg);
        }

        if self.bg != Some(cell.bg) {
            out.bg(cell.bg);
            self.bg = Some(cell.bg);
        }
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

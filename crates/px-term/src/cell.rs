// SPDX-License-Identifier: MIT
//
// Cell — one terminal character cell, plus the colors it carries.
//
// A frame is a grid of these. Each cell holds a Unicode codepoint, a
// foreground and background color, and a small set of text attributes.
// The struct is Copy and PartialEq so the differential renderer can
// compare whole rows with a slice comparison.
//
// Colors are plain 8-bit RGB or "terminal default" — a pixel editor
// works in RGBA end to end, so there is no palette indirection and no
// color-space math here. Alpha never reaches a cell: the canvas decides
// what color a pixel displays as before it is painted.

use bitflags::bitflags;

bitflags! {
    /// Text attributes applied to a cell (SGR flags).
    ///
    /// Only the attributes the editor actually uses: the tab bar and
    /// modal highlights use `INVERSE`, the status line uses `BOLD` and
    /// `DIM`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD    = 0b0000_0001;
        const DIM     = 0b0000_0010;
        const INVERSE = 0b0000_0100;
    }
}

/// A cell color: the terminal's default, or 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    /// The terminal's configured default foreground/background.
    Default,
    /// A 24-bit truecolor value.
    Rgb(u8, u8, u8),
}

impl CellColor {
    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

// ─── Cell ───────────────────────────────────────────────────────────────────

/// Continuation marker: a cell whose `ch` is 0 belongs to the preceding
/// wide character and must not produce character output of its own.
const CONTINUATION: u32 = 0;

/// Default character for empty cells.
const SPACE: u32 = b' ' as u32;

/// One terminal cell: codepoint, colors, attributes.
///
/// Wide characters (CJK in file names, mostly) occupy two columns: the
/// first cell holds the codepoint, the second is a continuation cell
/// with `ch = 0`. The renderer skips the continuation's character output
/// but still applies its background.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint to display. `0` marks a continuation cell.
    pub ch: u32,
    /// Foreground (text) color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

impl Cell {
    /// An empty cell: space, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a fully styled cell.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// Create a continuation cell for the second column of a wide char.
    ///
    /// Inherits the parent's colors and attributes so the background
    /// fills correctly.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    /// Whether this is a continuation cell.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The codepoint as a `char`, if valid. `None` for continuations.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// Replace the foreground color.
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    /// Replace the background color.
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    /// Replace the attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if self.fg != CellColor::Default {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if self.bg != CellColor::Default {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", attrs={:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// FrameBuffer — the in-memory cell grid a frame is painted into.
//
// The application paints cells, text, and filled rectangles here; the
// differential renderer then compares the result against the previous
// frame and emits ANSI only for what changed.
//
// Coordinates are 0-indexed with (0,0) at the top-left. All painting is
// bounds-checked and silently clipped at the buffer edge — painting is a
// best-effort operation, never an error.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell, CellColor};

/// A 2D grid of cells representing one terminal frame.
#[derive(Clone)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer of the given size, filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is inside the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major index of `(x, y)`. Caller guarantees in-bounds.
    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// The cell at `(x, y)`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        self.cells.get(idx)
    }

    /// One full row of cells, or `None` if `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        let end = start + usize::from(self.width);
        Some(&self.cells[start..end])
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy another buffer's cells into this one.
    ///
    /// Both buffers must have the same dimensions; used by the renderer
    /// to store the previous frame without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.width, other.width);
        assert_eq!(self.height, other.height);
        self.cells.copy_from_slice(&other.cells);
    }

    // ─── Painting ───────────────────────────────────────────────────────

    /// Write a cell directly. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Fill a rectangle with spaces in the given background color.
    ///
    /// The rectangle is clipped to the buffer; foreground and attributes
    /// are cleared in the filled area.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, bg: CellColor) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);
        for row in y..y2 {
            for col in x..x2 {
                let idx = self.index(col, row);
                self.cells[idx] = Cell::new(' ').with_bg(bg);
            }
        }
    }

    /// Paint a text string with wide-character handling.
    ///
    /// Characters are placed left-to-right starting at `(x, y)`. Wide
    /// characters (CJK file names) occupy two columns; a continuation
    /// cell is placed at `x+1`. Zero-width characters are skipped. If a
    /// wide character doesn't fit at the right edge, a space is painted
    /// instead — partial wide chars produce terminal garbage.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: CellColor,
        bg: CellColor,
        attrs: Attr,
    ) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;

        for ch in text.chars() {
            if col >= self.width {
                break;
            }

            let char_w = ch.width().unwrap_or(0);
            if char_w == 0 {
                continue;
            }
            let is_wide = char_w == 2;

            if is_wide && col + 1 >= self.width {
                self.set(col, y, Cell::styled(' ', fg, bg, attrs));
                col += 1;
                break;
            }

            self.set(col, y, Cell::styled(ch, fg, bg, attrs));
            if is_wide {
                self.set(col + 1, y, Cell::continuation(fg, bg, attrs));
            }

            // char_w is 1 or 2 — safe truncation to u16.
            #[allow(clippy::cast_possible_truncation)]
            let w = char_w as u16;
            col = col.saturating_add(w);
        }

        col.saturating_sub(x)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

/// Display width of a string in terminal columns.
///
/// Wide characters count as 2, zero-width and control characters as 0.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Viewport geometry and canvas rendering.
//
// The screen layout is fixed: row 0 is the tab bar, row 1 the status
// line, and everything below is the viewport. Each logical pixel renders
// as two terminal cells side by side, which makes pixels roughly square
// on common fonts.
//
// Viewport geometry is derived from the terminal size every frame, never
// stored — a resize just changes what the next frame derives.

use px_term::buffer::FrameBuffer;
use px_term::cell::{Attr, Cell, CellColor};
use px_term::terminal::Size;

use crate::document::Document;

/// Terminal cells per logical pixel column.
pub const PIXEL_WIDTH: u16 = 2;

/// Screen rows reserved above the viewport (tab bar + status line).
pub const HEADER_ROWS: u16 = 2;

/// Cursor glyph overlaid on the cursor pixel.
const CURSOR_GLYPH: char = 'X';

// ─── Viewport ───────────────────────────────────────────────────────────────

/// The visible window into a canvas, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Visible pixel columns.
    pub cols: u32,
    /// Visible pixel rows.
    pub rows: u32,
}

impl Viewport {
    /// Derive the viewport from the terminal size.
    ///
    /// Horizontal capacity is halved by the cell doubling; vertical
    /// capacity loses the two header rows.
    #[must_use]
    pub fn from_terminal(size: Size) -> Self {
        Self {
            cols: u32::from(size.cols / PIXEL_WIDTH),
            rows: u32::from(size.rows.saturating_sub(HEADER_ROWS)),
        }
    }

    /// Visible extent on one axis: the window size, or whatever remains
    /// of the canvas past the origin, whichever is smaller.
    ///
    /// Small images in large terminals render less than the window.
    #[inline]
    #[must_use]
    pub fn extent(window: u32, dimension: u32, origin: u32) -> u32 {
        window.min(dimension.saturating_sub(origin))
    }
}

// ─── Pointer mapping ────────────────────────────────────────────────────────

/// Map a pointer position in terminal cells to a canvas coordinate.
///
/// Returns `None` for positions on the header rows or outside the
/// rendered extent of the viewport — those events must be ignored, never
/// clamped into the canvas.
#[must_use]
pub fn pointer_target(
    doc: &Document,
    viewport: Viewport,
    cell_x: u16,
    cell_y: u16,
) -> Option<(u32, u32)> {
    if cell_y < HEADER_ROWS {
        return None;
    }

    let px = u32::from(cell_x / PIXEL_WIDTH);
    let py = u32::from(cell_y - HEADER_ROWS);

    let extent_x = Viewport::extent(viewport.cols, doc.canvas.width(), doc.view_x);
    let extent_y = Viewport::extent(viewport.rows, doc.canvas.height(), doc.view_y);

    if px >= extent_x || py >= extent_y {
        return None;
    }

    Some((doc.view_x + px, doc.view_y + py))
}

// ─── Rendering ──────────────────────────────────────────────────────────────

/// Paint the visible portion of a document's canvas into the frame.
///
/// Each visible pixel becomes two cells of background color starting at
/// row [`HEADER_ROWS`]. The cursor pixel is overlaid with a glyph in the
/// channel-inverted color so it contrasts on any background.
pub fn render(doc: &Document, viewport: Viewport, frame: &mut FrameBuffer) {
    let extent_x = Viewport::extent(viewport.cols, doc.canvas.width(), doc.view_x);
    let extent_y = Viewport::extent(viewport.rows, doc.canvas.height(), doc.view_y);

    for py in 0..extent_y {
        let y = doc.view_y + py;
        // py < rows <= u16 range after the header offset.
        #[allow(clippy::cast_possible_truncation)]
        let row = HEADER_ROWS + py as u16;

        for px in 0..extent_x {
            let x = doc.view_x + px;
            let pixel = doc.canvas.get(x, y);
            let bg = CellColor::Rgb(pixel.r, pixel.g, pixel.b);

            #[allow(clippy::cast_possible_truncation)]
            let col = px as u16 * PIXEL_WIDTH;

            if (x, y) == (doc.cur_x, doc.cur_y) {
                let inv = pixel.inverted();
                let fg = CellColor::Rgb(inv.r, inv.g, inv.b);
                frame.set(col, row, Cell::styled(CURSOR_GLYPH, fg, bg, Attr::empty()));
                frame.set(col + 1, row, Cell::new(' ').with_bg(bg));
            } else {
                frame.set(col, row, Cell::new(' ').with_bg(bg));
                frame.set(col + 1, row, Cell::new(' ').with_bg(bg));
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::pixel::Rgba;
    use std::path::PathBuf;

    fn doc(width: u32, height: u32) -> Document {
        Document::new(
            PathBuf::from("test.png"),
            Canvas::new(width, height, Rgba::OPAQUE_BLACK),
        )
    }

    // ── Viewport derivation ─────────────────────────────────────────────

    #[test]
    fn viewport_from_terminal_halves_columns() {
        let vp = Viewport::from_terminal(Size { cols: 80, rows: 24 });
        assert_eq!(vp, Viewport { cols: 40, rows: 22 });
    }

    #[test]
    fn viewport_from_tiny_terminal_is_zero_rows() {
        let vp = Viewport::from_terminal(Size { cols: 10, rows: 2 });
        assert_eq!(vp.rows, 0);
    }

    #[test]
    fn extent_is_window_when_canvas_large() {
        assert_eq!(Viewport::extent(40, 100, 0), 40);
    }

    #[test]
    fn extent_shrinks_near_canvas_edge() {
        assert_eq!(Viewport::extent(40, 100, 70), 30);
    }

    #[test]
    fn extent_is_canvas_when_image_small() {
        assert_eq!(Viewport::extent(40, 8, 0), 8);
    }

    // ── Pointer mapping ─────────────────────────────────────────────────

    #[test]
    fn pointer_on_header_rows_is_rejected() {
        let doc = doc(16, 16);
        let vp = Viewport { cols: 40, rows: 22 };
        assert_eq!(pointer_target(&doc, vp, 5, 0), None);
        assert_eq!(pointer_target(&doc, vp, 5, 1), None);
    }

    #[test]
    fn pointer_maps_with_cell_doubling() {
        let doc = doc(16, 16);
        let vp = Viewport { cols: 40, rows: 22 };
        // Cells 6 and 7 both land on pixel column 3.
        assert_eq!(pointer_target(&doc, vp, 6, 2), Some((3, 0)));
        assert_eq!(pointer_target(&doc, vp, 7, 2), Some((3, 0)));
    }

    #[test]
    fn pointer_offsets_by_viewport_origin() {
        let mut d = doc(64, 64);
        d.view_x = 10;
        d.view_y = 5;
        let vp = Viewport { cols: 40, rows: 22 };
        assert_eq!(pointer_target(&d, vp, 0, 2), Some((10, 5)));
        assert_eq!(pointer_target(&d, vp, 4, 6), Some((12, 9)));
    }

    #[test]
    fn pointer_past_rendered_extent_is_rejected() {
        // 4x4 image in a big viewport: cells beyond pixel column/row 3
        // are blank screen, not canvas.
        let doc = doc(4, 4);
        let vp = Viewport { cols: 40, rows: 22 };
        assert_eq!(pointer_target(&doc, vp, 8, 2), None);
        assert_eq!(pointer_target(&doc, vp, 0, 6), None);
        assert_eq!(pointer_target(&doc, vp, 7, 5), Some((3, 3)));
    }

    // ── Rendering ───────────────────────────────────────────────────────

    #[test]
    fn render_paints_pixel_as_two_cells() {
        let mut d = doc(3, 2);
        d.canvas.set(1, 0, Rgba::new(200, 100, 50, 255));
        // Move the cursor away from the pixel under test.
        d.cur_x = 0;
        d.cur_y = 1;

        let vp = Viewport { cols: 10, rows: 10 };
        let mut frame = FrameBuffer::new(20, 12);
        render(&d, vp, &mut frame);

        let bg = CellColor::Rgb(200, 100, 50);
        assert_eq!(frame.get(2, 2).unwrap().bg, bg);
        assert_eq!(frame.get(3, 2).unwrap().bg, bg);
        // Next pixel over is black.
        assert_eq!(frame.get(4, 2).unwrap().bg, CellColor::Rgb(0, 0, 0));
    }

    #[test]
    fn render_overlays_cursor_glyph_in_inverted_color() {
        let mut d = doc(2, 2);
        d.canvas.set(0, 0, Rgba::new(255, 0, 0, 255));

        let vp = Viewport { cols: 10, rows: 10 };
        let mut frame = FrameBuffer::new(20, 12);
        render(&d, vp, &mut frame);

        let cell = frame.get(0, 2).unwrap();
        assert_eq!(cell.character(), Some('X'));
        assert_eq!(cell.fg, CellColor::Rgb(0, 255, 255));
        assert_eq!(cell.bg, CellColor::Rgb(255, 0, 0));
    }

    #[test]
    fn render_clips_to_rendered_extent() {
        let d = doc(2, 2);
        let vp = Viewport { cols: 10, rows: 10 };
        let mut frame = FrameBuffer::new(20, 12);
        render(&d, vp, &mut frame);

        // Pixel column 2 doesn't exist — cells stay empty.
        assert_eq!(*frame.get(4, 2).unwrap(), Cell::EMPTY);
        assert_eq!(*frame.get(0, 4).unwrap(), Cell::EMPTY);
    }
}

// SPDX-License-Identifier: MIT
//
// Document — one open image and its editing state.
//
// A document owns its canvas, a viewport origin, an absolute cursor
// position, the active tool, and the two working colors. The navigation
// operations here are the invariant-keepers of the whole editor: after
// every one of them the cursor is inside the canvas and inside the
// visible window, and the viewport origin is inside the canvas. Nothing
// downstream re-checks bounds.
//
// Every step is exactly one pixel. A cursor move drags the viewport
// along when it would leave the window; a viewport scroll drags the
// cursor along when the window would leave it behind. Both adjustments
// are single-cell, matching the single-cell step.

use std::path::PathBuf;

use crate::canvas::Canvas;
use crate::pixel::Rgba;
use crate::tool::Tool;
use crate::view::Viewport;

/// A navigation direction, for cursor moves and viewport scrolls alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// One open image: canvas, viewport, cursor, tool, and working colors.
#[derive(Debug)]
pub struct Document {
    /// Where the image was loaded from; also the save target.
    pub path: PathBuf,
    /// The pixel buffer. Exclusively owned for the document's lifetime.
    pub canvas: Canvas,
    /// Viewport origin (top-left visible pixel), absolute coordinates.
    pub view_x: u32,
    pub view_y: u32,
    /// Cursor position, absolute coordinates (not viewport-relative).
    pub cur_x: u32,
    pub cur_y: u32,
    /// The active tool.
    pub tool: Tool,
    /// Color applied by the primary action.
    pub primary: Rgba,
    /// Color applied by the secondary action.
    pub secondary: Rgba,
    /// Unsaved changes flag. Set by draws, cleared by a successful save.
    pub modified: bool,
}

impl Document {
    /// Create a document for a freshly decoded canvas.
    ///
    /// Viewport and cursor start at the origin, the tool is Draw, and
    /// both colors default to opaque black.
    #[must_use]
    pub fn new(path: PathBuf, canvas: Canvas) -> Self {
        Self {
            path,
            canvas,
            view_x: 0,
            view_y: 0,
            cur_x: 0,
            cur_y: 0,
            tool: Tool::Draw,
            primary: Rgba::OPAQUE_BLACK,
            secondary: Rgba::OPAQUE_BLACK,
            modified: false,
        }
    }

    /// The tab label: file name, with a `*` suffix when modified.
    #[must_use]
    pub fn tab_label(&self) -> String {
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        if self.modified {
            format!("{name}*")
        } else {
            name
        }
    }

    // ─── Navigation ─────────────────────────────────────────────────────

    /// Move the cursor one pixel, scrolling the viewport to follow.
    ///
    /// No-op at the canvas edge. If the new cursor position leaves the
    /// visible window, the viewport origin shifts by one in the same
    /// direction so the cursor becomes the window's boundary cell.
    pub fn move_cursor(&mut self, dir: Direction, viewport: Viewport) {
        match dir {
            Direction::Left => {
                if self.cur_x > 0 {
                    self.cur_x -= 1;
                    if self.cur_x < self.view_x {
                        self.view_x -= 1;
                    }
                }
            }
            Direction::Right => {
                if self.cur_x + 1 < self.canvas.width() {
                    self.cur_x += 1;
                    if self.cur_x >= self.view_x + viewport.cols {
                        self.view_x = (self.view_x + 1).min(self.canvas.width() - 1);
                    }
                }
            }
            Direction::Up => {
                if self.cur_y > 0 {
                    self.cur_y -= 1;
                    if self.cur_y < self.view_y {
                        self.view_y -= 1;
                    }
                }
            }
            Direction::Down => {
                if self.cur_y + 1 < self.canvas.height() {
                    self.cur_y += 1;
                    if self.cur_y >= self.view_y + viewport.rows {
                        self.view_y = (self.view_y + 1).min(self.canvas.height() - 1);
                    }
                }
            }
        }
    }

    /// Scroll the viewport one pixel, dragging the cursor if needed.
    ///
    /// No-op at the canvas edge. If the cursor falls outside the new
    /// window, it catches up by exactly one cell — the same step size
    /// as the scroll.
    pub fn scroll_view(&mut self, dir: Direction, viewport: Viewport) {
        match dir {
            Direction::Left => {
                if self.view_x > 0 {
                    self.view_x -= 1;
                    if self.cur_x >= self.view_x + viewport.cols {
                        self.cur_x -= 1;
                    }
                }
            }
            Direction::Right => {
                if self.view_x + 1 < self.canvas.width() {
                    self.view_x += 1;
                    if self.cur_x < self.view_x {
                        self.cur_x += 1;
                    }
                }
            }
            Direction::Up => {
                if self.view_y > 0 {
                    self.view_y -= 1;
                    if self.cur_y >= self.view_y + viewport.rows {
                        self.cur_y -= 1;
                    }
                }
            }
            Direction::Down => {
                if self.view_y + 1 < self.canvas.height() {
                    self.view_y += 1;
                    if self.cur_y < self.view_y {
                        self.cur_y += 1;
                    }
                }
            }
        }
    }

    /// Place the cursor at an absolute canvas coordinate.
    ///
    /// Used by pointer events, whose targets are already validated by
    /// the pointer mapping — coordinates here are in-bounds and inside
    /// the visible window by construction.
    pub fn set_cursor(&mut self, x: u32, y: u32) {
        debug_assert!(x < self.canvas.width() && y < self.canvas.height());
        self.cur_x = x;
        self.cur_y = y;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport { cols: 4, rows: 3 };

    fn doc(width: u32, height: u32) -> Document {
        Document::new(
            PathBuf::from("img/sprite.png"),
            Canvas::new(width, height, Rgba::OPAQUE_BLACK),
        )
    }

    /// Helper: the document invariants every navigation op must keep.
    fn assert_invariants(d: &Document, vp: Viewport) {
        assert!(d.cur_x < d.canvas.width());
        assert!(d.cur_y < d.canvas.height());
        assert!(d.view_x < d.canvas.width());
        assert!(d.view_y < d.canvas.height());
        assert!(d.cur_x >= d.view_x && d.cur_x < d.view_x + vp.cols);
        assert!(d.cur_y >= d.view_y && d.cur_y < d.view_y + vp.rows);
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_document_starts_at_origin() {
        let d = doc(8, 8);
        assert_eq!((d.view_x, d.view_y), (0, 0));
        assert_eq!((d.cur_x, d.cur_y), (0, 0));
        assert_eq!(d.tool, Tool::Draw);
        assert_eq!(d.primary, Rgba::OPAQUE_BLACK);
        assert_eq!(d.secondary, Rgba::OPAQUE_BLACK);
        assert!(!d.modified);
    }

    #[test]
    fn tab_label_is_file_name() {
        let mut d = doc(8, 8);
        assert_eq!(d.tab_label(), "sprite.png");
        d.modified = true;
        assert_eq!(d.tab_label(), "sprite.png*");
    }

    // ── Cursor moves ────────────────────────────────────────────────────

    #[test]
    fn move_left_at_edge_is_noop() {
        let mut d = doc(8, 8);
        d.move_cursor(Direction::Left, VP);
        assert_eq!((d.cur_x, d.view_x), (0, 0));
    }

    #[test]
    fn move_right_repeatedly_stops_at_last_pixel() {
        let mut d = doc(8, 8);
        for _ in 0..20 {
            d.move_cursor(Direction::Right, VP);
            assert_invariants(&d, VP);
        }
        assert_eq!(d.cur_x, 7);

        d.move_cursor(Direction::Right, VP);
        assert_eq!(d.cur_x, 7);
    }

    #[test]
    fn cursor_drags_viewport_past_window_edge() {
        let mut d = doc(8, 8);
        // Window is 4 wide: moves to x=3 stay put, the 4th scrolls.
        for _ in 0..3 {
            d.move_cursor(Direction::Right, VP);
        }
        assert_eq!((d.cur_x, d.view_x), (3, 0));

        d.move_cursor(Direction::Right, VP);
        assert_eq!((d.cur_x, d.view_x), (4, 1));
    }

    #[test]
    fn cursor_drags_viewport_back_left() {
        let mut d = doc(8, 8);
        d.view_x = 2;
        d.cur_x = 2;
        d.move_cursor(Direction::Left, VP);
        assert_eq!((d.cur_x, d.view_x), (1, 1));
    }

    #[test]
    fn move_down_drags_viewport() {
        let mut d = doc(8, 8);
        for _ in 0..3 {
            d.move_cursor(Direction::Down, VP);
        }
        assert_eq!((d.cur_y, d.view_y), (3, 1));
        assert_invariants(&d, VP);
    }

    #[test]
    fn one_by_one_image_all_moves_are_noops() {
        let mut d = doc(1, 1);
        for dir in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            d.move_cursor(dir, VP);
            assert_eq!((d.cur_x, d.cur_y), (0, 0));
            assert_eq!((d.view_x, d.view_y), (0, 0));
        }
    }

    // ── Viewport scrolls ────────────────────────────────────────────────

    #[test]
    fn scroll_right_without_cursor_adjustment() {
        let mut d = doc(8, 8);
        d.cur_x = 2;
        d.scroll_view(Direction::Right, VP);
        assert_eq!((d.view_x, d.cur_x), (1, 2));
        assert_invariants(&d, VP);
    }

    #[test]
    fn scroll_right_drags_cursor_at_window_edge() {
        let mut d = doc(8, 8);
        assert_eq!(d.cur_x, 0);
        d.scroll_view(Direction::Right, VP);
        assert_eq!((d.view_x, d.cur_x), (1, 1));
    }

    #[test]
    fn scroll_left_drags_cursor_off_right_edge() {
        let mut d = doc(8, 8);
        d.view_x = 2;
        d.cur_x = 5; // Rightmost visible column of a 4-wide window.
        d.scroll_view(Direction::Left, VP);
        assert_eq!((d.view_x, d.cur_x), (1, 4));
        assert_invariants(&d, VP);
    }

    #[test]
    fn scroll_at_edges_is_noop() {
        let mut d = doc(8, 8);
        d.scroll_view(Direction::Left, VP);
        d.scroll_view(Direction::Up, VP);
        assert_eq!((d.view_x, d.view_y), (0, 0));
    }

    #[test]
    fn scroll_origin_never_leaves_canvas() {
        let mut d = doc(3, 3);
        for _ in 0..10 {
            d.scroll_view(Direction::Right, VP);
            d.scroll_view(Direction::Down, VP);
        }
        assert_eq!((d.view_x, d.view_y), (2, 2));
        assert!(d.cur_x < 3 && d.cur_y < 3);
    }

    // ── Mixed sequences keep invariants ─────────────────────────────────

    #[test]
    fn random_walk_keeps_invariants() {
        let mut d = doc(16, 12);
        let dirs = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];
        for i in 0..200 {
            let dir = dirs[i % 4];
            if i % 3 == 0 {
                d.scroll_view(dir, VP);
            } else {
                d.move_cursor(dir, VP);
            }
            assert_invariants(&d, VP);
        }
    }
}

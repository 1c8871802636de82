// SPDX-License-Identifier: MIT
//
// Differential frame renderer.
//
// Most frames in a pixel editor differ from the previous one in a
// handful of cells: the cursor left one spot, arrived at another, the
// status line changed. The renderer keeps the last frame it sent and
// emits escape sequences only for cells that changed since then.
//
// A row that is identical to its previous version is skipped with one
// slice comparison, before any per-cell work. The output of a frame is
// bracketed in DEC 2026 sync markers so the terminal presents it
// atomically, and ends with SGR 0 so nothing leaks into the shell when
// the process exits mid-style.
//
// The stored frame's allocation is reused between frames of the same
// size; only the first frame and resizes allocate.

use std::io::{self, Write};

use crate::buffer::FrameBuffer;
use crate::emit::{seq, CellWriter, Sink};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What one render pass did, for tests and profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that changed and were emitted.
    pub cells_rendered: usize,
    /// Cells identical to the previous frame.
    pub cells_skipped: usize,
    /// Bytes of ANSI produced for this frame.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Rendered plus skipped.
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits the difference between successive frames as ANSI bytes.
///
/// Call [`render`](Self::render) with the freshly painted frame, then
/// [`flush`](Self::flush) to push the bytes to the terminal in a single
/// write. [`output_bytes`](Self::output_bytes) exposes the unsent bytes
/// for inspection.
pub struct DiffRenderer {
    sink: Sink,
    writer: CellWriter,
    shown: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no frame on record; the first render paints
    /// everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: Sink::new(),
            writer: CellWriter::new(),
            shown: None,
        }
    }

    /// Compare `frame` with what the terminal currently shows and queue
    /// the sequences that reconcile the two.
    pub fn render(&mut self, frame: &FrameBuffer) -> RenderStats {
        self.sink.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        let (width, height) = (frame.width(), frame.height());

        if width == 0 || height == 0 {
            self.remember(frame);
            return stats;
        }

        // No stored frame, or one of another size: repaint from scratch.
        let repaint = !self
            .shown
            .as_ref()
            .is_some_and(|s| s.width() == width && s.height() == height);

        self.sink.raw(seq::SYNC_ON);
        if repaint {
            self.sink.raw(seq::CLEAR_SCREEN);
        }

        for y in 0..height {
            let old_row = if repaint {
                None
            } else {
                self.shown.as_ref().and_then(|s| s.row(y))
            };

            // y < height, so the row exists.
            let row = frame.row(y).unwrap();

            if old_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            for x in 0..width {
                let cell = &row[usize::from(x)];
                if old_row.is_some_and(|old| old[usize::from(x)] == *cell) {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.sink, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        self.sink.raw(seq::SGR_RESET);
        self.sink.raw(seq::SYNC_OFF);
        stats.bytes_written = self.sink.len();

        self.remember(frame);
        stats
    }

    /// Bytes queued by the last [`render`](Self::render), still unsent.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.sink.bytes()
    }

    /// Send the queued bytes to stdout in one write.
    ///
    /// # Errors
    ///
    /// Returns an error when the write to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush_stdout()
    }

    /// Send the queued bytes to `w` in one write.
    ///
    /// # Errors
    ///
    /// Returns an error when writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.sink.flush_to(w)
    }

    /// Forget the stored frame; the next render repaints everything.
    /// Needed after a resize or anything else that clobbered the screen.
    pub fn force_redraw(&mut self) {
        self.shown = None;
    }

    fn remember(&mut self, frame: &FrameBuffer) {
        match self.shown.as_mut() {
            Some(s) if s.width() == frame.width() && s.height() == frame.height() => {
                s.copy_from(frame);
            }
            _ => self.shown = Some(frame.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell, CellColor};

    fn pass(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let out = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        (stats, out)
    }

    // ── First frame ─────────────────────────────────────────────────────

    #[test]
    fn first_frame_paints_every_cell() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(12, 4);

        let (stats, out) = pass(&mut r, &frame);

        assert_eq!(stats.cells_rendered, 48);
        assert_eq!(stats.cells_skipped, 0);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn frame_is_bracketed_in_sync_markers() {
        let mut r = DiffRenderer::new();
        let (_, out) = pass(&mut r, &FrameBuffer::new(12, 4));

        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn frame_resets_style_before_closing() {
        let mut r = DiffRenderer::new();
        let (_, out) = pass(&mut r, &FrameBuffer::new(12, 4));

        assert!(out.contains("\x1b[0m\x1b[?2026l"));
    }

    // ── Unchanged frames ────────────────────────────────────────────────

    #[test]
    fn repeated_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(12, 4);

        r.render(&frame);
        let (stats, out) = pass(&mut r, &frame);

        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 48);
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn repeated_frame_is_only_markers() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(12, 4);

        r.render(&frame);
        let (stats, _) = pass(&mut r, &frame);

        // Sync on/off plus the style reset and nothing else.
        assert!(stats.bytes_written < 30);
    }

    // ── Incremental changes ─────────────────────────────────────────────

    #[test]
    fn one_changed_cell_emits_one_cell() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(12, 4);

        r.render(&frame);
        frame.set(5, 2, Cell::new('Q'));

        let (stats, out) = pass(&mut r, &frame);

        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 47);
        assert!(out.contains("\x1b[3;6H"));
        assert!(out.contains('Q'));
    }

    #[test]
    fn scattered_changes_emit_exactly_those() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(24, 8);

        r.render(&frame);
        frame.set(0, 0, Cell::new('A'));
        frame.set(11, 4, Cell::new('B'));
        frame.set(23, 7, Cell::new('C'));

        let (stats, out) = pass(&mut r, &frame);

        assert_eq!(stats.cells_rendered, 3);
        assert_eq!(stats.cells_skipped, 189);
        assert!(out.contains('A'));
        assert!(out.contains('B'));
        assert!(out.contains('C'));
    }

    #[test]
    fn changed_row_leaves_other_rows_untouched() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(96, 40);

        r.render(&frame);

        let red = CellColor::Rgb(255, 0, 0);
        for x in 0..96 {
            frame.set(x, 20, Cell::new(' ').with_bg(red));
        }

        let (stats, _) = pass(&mut r, &frame);

        assert_eq!(stats.cells_rendered, 96);
        assert_eq!(stats.cells_skipped, 3744);
    }

    // ── Size changes ────────────────────────────────────────────────────

    #[test]
    fn size_change_repaints_from_scratch() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(12, 4));

        let (stats, out) = pass(&mut r, &FrameBuffer::new(24, 8));

        assert_eq!(stats.cells_rendered, 192);
        assert_eq!(stats.cells_skipped, 0);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn empty_frame_produces_nothing() {
        let mut r = DiffRenderer::new();
        let (stats, _) = pass(&mut r, &FrameBuffer::new(0, 0));

        assert_eq!(stats.total_cells(), 0);
        assert_eq!(stats.bytes_written, 0);
    }

    // ── Styles ──────────────────────────────────────────────────────────

    #[test]
    fn styled_cell_carries_its_escapes() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(8, 1);

        r.render(&frame);
        frame.set(
            0,
            0,
            Cell::styled(
                'E',
                CellColor::Rgb(255, 0, 0),
                CellColor::Rgb(0, 0, 255),
                Attr::BOLD | Attr::INVERSE,
            ),
        );

        let (_, out) = pass(&mut r, &frame);

        assert!(out.contains("\x1b[1;7m"));
        assert!(out.contains("\x1b[38;2;255;0;0m"));
        assert!(out.contains("\x1b[48;2;0;0;255m"));
        assert!(out.contains('E'));
    }

    // ── force_redraw ────────────────────────────────────────────────────

    #[test]
    fn force_redraw_discards_the_stored_frame() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(12, 4);

        r.render(&frame);
        let (stats, _) = pass(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 0);

        r.force_redraw();

        let (stats, out) = pass(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 48);
        assert!(out.contains("\x1b[2J"));
    }

    // ── Frame-to-frame tracking ─────────────────────────────────────────

    #[test]
    fn each_render_diffs_against_the_one_before() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(12, 4);

        let (s1, _) = pass(&mut r, &frame);
        assert_eq!(s1.cells_rendered, 48);

        frame.set(0, 0, Cell::new('!'));
        let (s2, _) = pass(&mut r, &frame);
        assert_eq!(s2.cells_rendered, 1);

        frame.set(0, 0, Cell::EMPTY);
        let (s3, _) = pass(&mut r, &frame);
        assert_eq!(s3.cells_rendered, 1);

        let (s4, _) = pass(&mut r, &frame);
        assert_eq!(s4.cells_rendered, 0);
    }
}

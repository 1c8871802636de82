// SPDX-License-Identifier: MIT
//
// pxe — a terminal pixel-art editor.
//
// This is the main binary that wires together the two crates:
//
//   px-term   → terminal control, rendering, input parsing, event loop
//   px-editor → pixel canvas, documents, tools, tabs, viewport math
//
// The Editor struct implements px-term's App trait, connecting the event
// loop to the editor's state. Each input flows through:
//
//   stdin → parser → on_event → key/mouse dispatch → document mutation
//   paint → tab bar + status + viewport → framebuffer → diff renderer
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ tab bar                      │  ← row 0
//   ├──────────────────────────────┤
//   │ status / message line        │  ← row 1
//   ├──────────────────────────────┤
//   │ canvas viewport              │  ← rows 2..h (2 cells per pixel)
//   └──────────────────────────────┘
//
// A modal (tool picker or save dialog) captures all input while open and
// is painted over the top-left corner of the viewport.

use std::env;
use std::path::PathBuf;
use std::process;

use px_editor::codec::{self, SaveFormat};
use px_editor::document::Direction;
use px_editor::tabs::DocumentSet;
use px_editor::tool::{self, Tool};
use px_editor::view::{self, Viewport};

use px_term::buffer::{FrameBuffer, string_width};
use px_term::cell::{Attr, Cell, CellColor};
use px_term::event_loop::{Action, App, EventLoop};
use px_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseEvent, MouseEventKind};
use px_term::terminal::Size;

// ─── Modal ──────────────────────────────────────────────────────────────────

/// Which list the open modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalKind {
    /// Tool selection (`t`).
    ToolPicker,
    /// Save format selection (`Ctrl+S`).
    SaveFormat,
}

/// A modal selection list, drawn as a centered bordered box. While one
/// is open it captures all input: navigation moves the highlight
/// cyclically, Enter/Space commits, Escape or Backspace cancels, and a
/// click on an entry commits it. Clicks outside the box are ignored.
#[derive(Debug, Clone, Copy)]
struct Modal {
    kind: ModalKind,
    /// Index of the highlighted entry.
    sel: usize,
}

impl Modal {
    /// Open the tool picker with the document's current tool highlighted.
    fn tool_picker(current: Tool) -> Self {
        let sel = Tool::ALL.iter().position(|t| *t == current).unwrap_or(0);
        Self {
            kind: ModalKind::ToolPicker,
            sel,
        }
    }

    /// Open the save dialog with the first format highlighted.
    const fn save_format() -> Self {
        Self {
            kind: ModalKind::SaveFormat,
            sel: 0,
        }
    }

    const fn title(self) -> &'static str {
        match self.kind {
            ModalKind::ToolPicker => "Tool",
            ModalKind::SaveFormat => "Save as",
        }
    }

    fn labels(self) -> Vec<&'static str> {
        match self.kind {
            ModalKind::ToolPicker => Tool::ALL.iter().map(|t| t.label()).collect(),
            ModalKind::SaveFormat => SaveFormat::ALL.iter().map(|f| f.label()).collect(),
        }
    }

    fn len(self) -> usize {
        self.labels().len()
    }

    /// Move the highlight one entry up, wrapping at the top.
    fn select_prev(&mut self) {
        let n = self.len();
        self.sel = (self.sel + n - 1) % n;
    }

    /// Move the highlight one entry down, wrapping at the bottom.
    fn select_next(&mut self) {
        self.sel = (self.sel + 1) % self.len();
    }

    /// Interior width in columns: widest label (or the title) plus one
    /// cell of padding on each side.
    fn width(self) -> u16 {
        let widest = self
            .labels()
            .iter()
            .map(|l| string_width(l))
            .max()
            .unwrap_or(0);
        let w = string_width(self.title()).max(widest) + 2;
        u16::try_from(w).unwrap_or(u16::MAX)
    }

    /// Outer box size including the border.
    fn box_size(self) -> (u16, u16) {
        let h = u16::try_from(self.len()).unwrap_or(u16::MAX).saturating_add(2);
        (self.width().saturating_add(2), h)
    }

    /// Top-left corner of the box, centered on the screen.
    fn origin(self, cols: u16, rows: u16) -> (u16, u16) {
        let (w, h) = self.box_size();
        (cols.saturating_sub(w) / 2, rows.saturating_sub(h) / 2)
    }

    /// The entry under a screen position, if the click lands inside the
    /// box on an entry row.
    fn hit(self, cols: u16, rows: u16, x: u16, y: u16) -> Option<usize> {
        let (box_w, _) = self.box_size();
        let (ox, oy) = self.origin(cols, rows);
        if x <= ox || x >= ox + box_w - 1 || y <= oy {
            return None;
        }
        let idx = usize::from(y - oy - 1);
        (idx < self.len()).then_some(idx)
    }
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The editor application state: all open documents, the viewport
/// geometry derived from the last resize, the open modal (if any), and
/// a transient status message.
struct Editor {
    docs: DocumentSet,
    size: Size,
    viewport: Viewport,
    modal: Option<Modal>,

    /// A message shown on the status line instead of the regular status.
    /// Cleared on the next input event.
    message: Option<String>,
}

impl Editor {
    fn new() -> Self {
        // Sensible default until the first on_resize.
        let size = Size { cols: 80, rows: 24 };
        Self {
            docs: DocumentSet::new(),
            size,
            viewport: Viewport::from_terminal(size),
            modal: None,
            message: None,
        }
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    // ── Key dispatch ────────────────────────────────────────────────────

    fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if key.modifiers.contains(Modifiers::CTRL) {
            match key.code {
                KeyCode::Char('c') => return Action::Quit,
                KeyCode::Char('s') => {
                    self.modal = Some(Modal::save_format());
                    return Action::Continue;
                }
                _ => {}
            }
        }

        match key.code {
            // -- Cursor movement (lowercase, or arrows) --
            KeyCode::Char('a') | KeyCode::Left => self.move_cursor(Direction::Left),
            KeyCode::Char('d') | KeyCode::Right => self.move_cursor(Direction::Right),
            KeyCode::Char('w') | KeyCode::Up => self.move_cursor(Direction::Up),
            KeyCode::Char('s') | KeyCode::Down => self.move_cursor(Direction::Down),

            // -- Viewport scrolling (uppercase) --
            KeyCode::Char('A') => self.scroll_view(Direction::Left),
            KeyCode::Char('D') => self.scroll_view(Direction::Right),
            KeyCode::Char('W') => self.scroll_view(Direction::Up),
            KeyCode::Char('S') => self.scroll_view(Direction::Down),

            // -- Tool selection --
            KeyCode::Char('1') => self.set_tool(Tool::Draw),
            KeyCode::Char('2') => self.set_tool(Tool::Pipette),
            KeyCode::Char('t') => {
                if let Some(doc) = self.docs.active() {
                    self.modal = Some(Modal::tool_picker(doc.tool));
                }
            }

            // -- Tabs --
            KeyCode::Tab | KeyCode::Char(']') => self.docs.next_tab(),
            KeyCode::Char('[') => self.docs.prev_tab(),
            KeyCode::Char('x') => {
                if !self.docs.close_active() {
                    return Action::Quit;
                }
            }

            // -- Everything else activates the tool at the cursor --
            _ => {
                let action = tool::classify(&Event::Key(*key));
                if let Some(doc) = self.docs.active_mut() {
                    tool::dispatch(doc, action);
                }
            }
        }

        Action::Continue
    }

    fn move_cursor(&mut self, dir: Direction) {
        let viewport = self.viewport;
        if let Some(doc) = self.docs.active_mut() {
            doc.move_cursor(dir, viewport);
        }
    }

    fn scroll_view(&mut self, dir: Direction) {
        let viewport = self.viewport;
        if let Some(doc) = self.docs.active_mut() {
            doc.scroll_view(dir, viewport);
        }
    }

    fn set_tool(&mut self, tool: Tool) {
        if let Some(doc) = self.docs.active_mut() {
            doc.tool = tool;
        }
    }

    // ── Mouse dispatch ──────────────────────────────────────────────────

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_view(Direction::Up),
            MouseEventKind::ScrollDown => self.scroll_view(Direction::Down),
            MouseEventKind::Press(_) | MouseEventKind::Drag(_) => {
                let viewport = self.viewport;
                if let Some(doc) = self.docs.active_mut() {
                    // Presses outside the canvas (header rows, blank
                    // screen past a small image) are ignored entirely.
                    if let Some((x, y)) = view::pointer_target(doc, viewport, mouse.x, mouse.y) {
                        doc.set_cursor(x, y);
                        tool::dispatch(doc, tool::classify(&Event::Mouse(*mouse)));
                    }
                }
            }
            MouseEventKind::Release(_) | MouseEventKind::Move => {}
        }
    }

    // ── Modal dispatch ──────────────────────────────────────────────────

    /// Handle an event while a modal is open. The modal consumes all
    /// input until committed or cancelled.
    fn handle_modal(&mut self, event: &Event) {
        let Some(mut modal) = self.modal else {
            return;
        };

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Char('w') | KeyCode::Up => {
                    modal.select_prev();
                    self.modal = Some(modal);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    modal.select_next();
                    self.modal = Some(modal);
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.modal = None;
                    self.commit_modal(modal);
                }
                KeyCode::Escape | KeyCode::Backspace => {
                    self.modal = None;
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    modal.select_prev();
                    self.modal = Some(modal);
                }
                MouseEventKind::ScrollDown => {
                    modal.select_next();
                    self.modal = Some(modal);
                }
                MouseEventKind::Press(_) => {
                    // Clicking an entry commits it; clicks outside the
                    // box are swallowed without effect.
                    if let Some(idx) =
                        modal.hit(self.size.cols, self.size.rows, mouse.x, mouse.y)
                    {
                        modal.sel = idx;
                        self.modal = None;
                        self.commit_modal(modal);
                    }
                }
                _ => {}
            },
        }
    }

    fn commit_modal(&mut self, modal: Modal) {
        match modal.kind {
            ModalKind::ToolPicker => self.set_tool(Tool::ALL[modal.sel]),
            ModalKind::SaveFormat => self.save_active(SaveFormat::ALL[modal.sel]),
        }
    }

    // ── Saving ──────────────────────────────────────────────────────────

    /// Encode the active document back to the file it was opened from,
    /// in the chosen format. The format controls the bytes written, not
    /// the file name.
    fn save_active(&mut self, format: SaveFormat) {
        let Some(doc) = self.docs.active_mut() else {
            return;
        };

        match codec::encode(format, &doc.path, &doc.canvas) {
            Ok(()) => {
                doc.modified = false;
                let name = doc.tab_label();
                self.set_message(format!("Saved {name}"));
            }
            Err(e) => self.set_message(format!("Save failed: {e}")),
        }
    }

    // ── Painting ────────────────────────────────────────────────────────

    fn paint_tab_bar(&self, frame: &mut FrameBuffer) {
        let mut x = 0;
        for (i, doc) in self.docs.documents().enumerate() {
            let attrs = if i == self.docs.active_index() {
                Attr::INVERSE
            } else {
                Attr::empty()
            };
            let label = format!(" {} ", doc.tab_label());
            x += frame.paint_text(x, 0, &label, CellColor::Default, CellColor::Default, attrs);
            if x >= frame.width() {
                break;
            }
        }
    }

    fn paint_status_line(&self, frame: &mut FrameBuffer) {
        if let Some(ref msg) = self.message {
            frame.paint_text(0, 1, msg, CellColor::Default, CellColor::Default, Attr::BOLD);
            return;
        }

        let Some(doc) = self.docs.active() else {
            return;
        };

        // Left side: alpha under the cursor, the two working colors as
        // swatches with their alpha values, then the tool name. The
        // swatches show RGB as background color; alpha has to be spelled
        // out since a terminal cell can't display it.
        let pixel = doc.canvas.get(doc.cur_x, doc.cur_y);
        let mut x = frame.paint_text(
            0,
            1,
            &format!("A:{:<3} ", pixel.a),
            CellColor::Default,
            CellColor::Default,
            Attr::empty(),
        );

        for color in [doc.primary, doc.secondary] {
            let bg = CellColor::Rgb(color.r, color.g, color.b);
            frame.set(x, 1, Cell::new(' ').with_bg(bg));
            frame.set(x + 1, 1, Cell::new(' ').with_bg(bg));
            x += 2;
            x += frame.paint_text(
                x,
                1,
                &format!("{:<3} ", color.a),
                CellColor::Default,
                CellColor::Default,
                Attr::empty(),
            );
        }

        frame.paint_text(
            x,
            1,
            doc.tool.label(),
            CellColor::Default,
            CellColor::Default,
            Attr::BOLD,
        );

        // Right side: cursor position and canvas dimensions.
        let right = format!(
            "{},{}  {}x{}",
            doc.cur_x,
            doc.cur_y,
            doc.canvas.width(),
            doc.canvas.height()
        );
        let right_w = u16::try_from(string_width(&right)).unwrap_or(u16::MAX);
        frame.paint_text(
            frame.width().saturating_sub(right_w),
            1,
            &right,
            CellColor::Default,
            CellColor::Default,
            Attr::empty(),
        );
    }

    fn paint_modal(modal: Modal, frame: &mut FrameBuffer) {
        let (box_w, box_h) = modal.box_size();
        let (ox, oy) = modal.origin(frame.width(), frame.height());

        // Border with the title embedded in the top edge.
        for row in 0..box_h {
            for col in 0..box_w {
                let edge_x = col == 0 || col == box_w - 1;
                let edge_y = row == 0 || row == box_h - 1;
                let ch = match (edge_x, edge_y) {
                    (true, true) => match (col == 0, row == 0) {
                        (true, true) => '┌',
                        (false, true) => '┐',
                        (true, false) => '└',
                        (false, false) => '┘',
                    },
                    (false, true) => '─',
                    (true, false) => '│',
                    (false, false) => ' ',
                };
                frame.set(ox + col, oy + row, Cell::new(ch));
            }
        }
        frame.paint_text(
            ox + 2,
            oy,
            &format!(" {} ", modal.title()),
            CellColor::Default,
            CellColor::Default,
            Attr::BOLD,
        );

        for (i, label) in modal.labels().iter().enumerate() {
            let row = oy + 1 + u16::try_from(i).unwrap_or(u16::MAX);
            let attrs = if i == modal.sel {
                Attr::INVERSE
            } else {
                Attr::empty()
            };
            // Pad to the interior width so the highlight forms a bar.
            for col in 1..box_w - 1 {
                frame.set(
                    ox + col,
                    row,
                    Cell::styled(' ', CellColor::Default, CellColor::Default, attrs),
                );
            }
            frame.paint_text(ox + 2, row, label, CellColor::Default, CellColor::Default, attrs);
        }
    }
}

impl App for Editor {
    fn on_event(&mut self, event: &Event) -> Action {
        // Any input replaces a lingering status message.
        self.message = None;

        if self.modal.is_some() {
            self.handle_modal(event);
            return Action::Continue;
        }

        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
        self.viewport = Viewport::from_terminal(size);
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.paint_tab_bar(frame);
        self.paint_status_line(frame);

        if let Some(doc) = self.docs.active() {
            view::render(doc, self.viewport, frame);
        }

        if let Some(modal) = self.modal {
            Self::paint_modal(modal, frame);
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Split the command line into image paths, skipping option arguments.
///
/// Options (arguments starting with `-`) are accepted and ignored for
/// now; `--` ends option parsing so files named like options can still
/// be opened.
fn parse_args(args: impl Iterator<Item = String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut options_done = false;

    for arg in args {
        if !options_done {
            if arg == "--" {
                options_done = true;
                continue;
            }
            if arg.len() > 1 && arg.starts_with('-') {
                continue;
            }
        }
        paths.push(PathBuf::from(arg));
    }

    paths
}

fn main() {
    let paths = parse_args(env::args().skip(1));

    if paths.is_empty() {
        eprintln!("usage: pxe [options] <image>...");
        process::exit(1);
    }

    // Open everything we can before touching the terminal, so decode
    // warnings stay readable on stderr.
    let mut editor = Editor::new();
    for path in paths {
        if let Err(e) = editor.docs.open(path.clone()) {
            eprintln!("pxe: {}: {e}", path.display());
        }
    }

    if editor.docs.is_empty() {
        eprintln!("pxe: no images could be opened");
        process::exit(1);
    }

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("pxe: failed to initialize terminal: {e}");
        process::exit(1);
    });

    if let Err(e) = event_loop.run(&mut editor) {
        eprintln!("pxe: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Tools — what an activation does to the pixel under the cursor.
//
// Every input that reaches the canvas is first reduced to one of three
// tool actions: primary, secondary, or ignored. The active tool then
// interprets the action. Draw writes a working color into the canvas;
// the pipette reads the canvas into a working color. The two actions
// mirror each other across both tools: primary pairs with the primary
// color, secondary with the secondary.

use px_term::input::{Event, KeyCode, MouseButton, MouseEventKind};

use crate::document::Document;

// ─── Tool ───────────────────────────────────────────────────────────────────

/// An editing tool, selected per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Write the working color into the pixel under the cursor.
    Draw,
    /// Sample the pixel under the cursor into the working color.
    Pipette,
}

impl Tool {
    /// All tools, in picker order.
    pub const ALL: [Self; 2] = [Self::Draw, Self::Pipette];

    /// Human-readable name for the status line and the tool picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Pipette => "Pipette",
        }
    }
}

// ─── Action classification ──────────────────────────────────────────────────

/// What a tool should do in response to one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    /// Apply the tool with the primary color.
    Primary,
    /// Apply the tool with the secondary color.
    Secondary,
    /// No tool activation.
    Ignored,
}

/// Reduce an input event to a tool action.
///
/// Left press or drag is the primary activation, any other button the
/// secondary. Releases, bare motion, and scroll never activate a tool.
/// On the keyboard, Enter and Space are primary; any other key that
/// falls through the editor's bindings is secondary.
#[must_use]
pub fn classify(event: &Event) -> ToolAction {
    match event {
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Press(MouseButton::Left)
            | MouseEventKind::Drag(MouseButton::Left) => ToolAction::Primary,
            MouseEventKind::Press(_) | MouseEventKind::Drag(_) => ToolAction::Secondary,
            MouseEventKind::Release(_)
            | MouseEventKind::Move
            | MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown => ToolAction::Ignored,
        },
        Event::Key(key) => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => ToolAction::Primary,
            _ => ToolAction::Secondary,
        },
    }
}

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// Apply a tool action to the pixel under the document's cursor.
///
/// Draw writes the matching working color and marks the document
/// modified. The pipette samples into the matching working color and
/// leaves the canvas untouched. Ignored actions do nothing.
pub fn dispatch(doc: &mut Document, action: ToolAction) {
    let (x, y) = (doc.cur_x, doc.cur_y);
    match (doc.tool, action) {
        (_, ToolAction::Ignored) => {}
        (Tool::Draw, ToolAction::Primary) => {
            doc.canvas.set(x, y, doc.primary);
            doc.modified = true;
        }
        (Tool::Draw, ToolAction::Secondary) => {
            doc.canvas.set(x, y, doc.secondary);
            doc.modified = true;
        }
        (Tool::Pipette, ToolAction::Primary) => {
            doc.primary = doc.canvas.get(x, y);
        }
        (Tool::Pipette, ToolAction::Secondary) => {
            doc.secondary = doc.canvas.get(x, y);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

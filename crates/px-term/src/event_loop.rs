// SPDX-License-Identifier: MIT
//
// The event loop.
//
// Single-threaded by design: the reader thread only moves bytes, and
// everything with state — parsing, the application, rendering — runs
// here. One iteration is: wait briefly for input, hand events to the
// application, fold in a resize if one was signalled, and repaint when
// something actually changed.
//
// Waiting happens on `recv_timeout` against the reader's channel. The
// timeout is doing double duty: it is the deadline after which pending
// parser bytes are flushed (so a lone ESC becomes the Escape key), and
// it bounds how long a SIGWINCH can sit unnoticed. Idle cost is one
// wakeup per timeout; frames are only painted when the dirty flag says
// an event or resize changed something.
//
// SIGWINCH itself does nothing but set an atomic — the only thing a
// signal handler can safely do — and the loop picks the flag up on its
// next pass.
#![allow(unsafe_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── Resize signal ───────────────────────────────────────────────────────────

/// Set from the SIGWINCH handler, consumed by the loop.
static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn watch_resizes() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn watch_resizes() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// The application's verdict after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// What an application plugs into the loop.
///
/// [`paint`](App::paint) is the only required method; it receives a
/// cleared frame and draws the whole UI into it. [`on_event`](App::on_event)
/// and [`on_resize`](App::on_resize) default to doing nothing.
pub trait App {
    /// React to one input event. [`Action::Quit`] ends the loop.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The terminal changed size. The frame passed to the next
    /// [`paint`](App::paint) already has the new dimensions.
    fn on_resize(&mut self, _size: Size) {}

    /// Draw the current state into `frame`. Called only when an event
    /// or resize made the previous frame stale.
    fn paint(&mut self, frame: &mut FrameBuffer);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Channel wait per iteration. Also the deadline for deciding that a
/// lone ESC was the Escape key rather than an unfinished sequence.
const INPUT_TIMEOUT: Duration = Duration::from_millis(10);

/// Ties terminal, parser, and renderer together around an [`App`].
///
/// [`run`](Self::run) owns the terminal for its whole duration: it
/// switches to full-screen mode on the way in and restores the
/// terminal on the way out, whether the loop ended by [`Action::Quit`]
/// or by an error.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
}

impl EventLoop {
    /// Set up the terminal handle (without entering full-screen mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
        })
    }

    /// The terminal size as of the last query.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run `app` until it quits.
    ///
    /// # Errors
    ///
    /// Returns an error if entering or leaving full-screen mode fails,
    /// or if a frame cannot be written to the terminal.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        watch_resizes();

        let (mut reader, rx) = StdinReader::spawn();
        let outcome = self.pump(app, &rx);

        // Restore even when the loop failed.
        reader.stop();
        self.terminal.leave()?;

        outcome
    }

    /// The loop proper, kept separate so `run` can always clean up.
    fn pump(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        app.on_resize(size);

        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(INPUT_TIMEOUT) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) => {
                    // Nothing new; settle any half-received sequence.
                    if self.parser.has_pending() {
                        self.parser.flush()
                    } else {
                        Vec::new()
                    }
                }
                // Reader thread is gone (stdin EOF); nothing more will
                // ever arrive, so quit instead of spinning.
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };

            if !events.is_empty() {
                dirty = true;
                for event in &events {
                    if app.on_event(event) == Action::Quit {
                        return Ok(());
                    }
                }
            }

            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;
                dirty = false;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent, Modifiers};

    struct BareApp;
    impl App for BareApp {
        fn paint(&mut self, _frame: &mut FrameBuffer) {}
    }

    #[test]
    fn new_loop_reports_a_size() {
        let event_loop = EventLoop::new().unwrap();
        assert!(event_loop.size().cols > 0);
        assert!(event_loop.size().rows > 0);
    }

    #[test]
    fn resize_flag_reads_once() {
        RESIZED.store(true, Ordering::Relaxed);
        assert!(RESIZED.swap(false, Ordering::Relaxed));
        assert!(!RESIZED.load(Ordering::Relaxed));
    }

    #[test]
    fn default_on_event_keeps_running() {
        let mut app = BareApp;
        let event = Event::Key(KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: Modifiers::empty(),
        });
        assert_eq!(app.on_event(&event), Action::Continue);
    }

    #[test]
    fn default_on_resize_accepts_any_size() {
        let mut app = BareApp;
        app.on_resize(Size { cols: 1, rows: 1 });
        app.on_resize(Size {
            cols: 500,
            rows: 200,
        });
    }
}

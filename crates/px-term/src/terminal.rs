// SPDX-License-Identifier: MIT
//
// Terminal takeover and restore.
//
// Raw mode, the alternate screen, and mouse reporting all have to be
// undone before the process exits, or the user's shell is left unusable.
// `Terminal` owns that state and restores it on `leave()` or on drop.
//
// Panics get their own path: a hook writes a pre-built restore sequence
// straight to fd 1 with `libc::write`, deliberately not going through
// `io::stdout()` — the panic may have happened while that lock was held.
// Termios is restored from a global backup the hook can reach without
// the `Terminal` value. Only then does the original hook print the
// panic message, onto a terminal that can actually display it.
//
// The unsafe here is confined to the POSIX calls this module exists
// for: tcgetattr/tcsetattr, ioctl(TIOCGWINSZ), isatty, and the raw
// write in the panic path.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::emit::seq;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in columns.
    pub cols: u16,
    /// Height in rows.
    pub rows: u16,
}

impl Size {
    /// `cols × rows`.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

/// Assumed when the real size cannot be queried (tests, pipes).
const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

/// Ask the kernel for the window size of stdout.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then(|| Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

/// Whether stdin is an actual terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Put stdin into raw mode, returning the previous termios settings.
#[cfg(unix)]
fn raw_mode_on() -> io::Result<libc::termios> {
    use std::os::unix::io::AsRawFd;
    let fd = io::stdin().as_raw_fd();

    unsafe {
        let mut saved: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &raw mut saved) != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = saved;
        libc::cfmakeraw(&raw mut raw);
        // Block until at least one byte; the reader thread handles timing.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw) != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(saved)
    }
}

#[cfg(unix)]
fn raw_mode_off(saved: &libc::termios) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = io::stdin().as_raw_fd();

    unsafe {
        if libc::tcsetattr(fd, libc::TCSAFLUSH, saved) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

// ─── Panic path ─────────────────────────────────────────────────────────────

/// Termios settings the panic hook restores. `None` while not raw.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Everything the terminal needs to hear to come back, in one literal:
/// sync off, mouse reporting off, SGR reset, cursor visible, and —
/// last, so no artifact survives — back to the primary screen.
#[rustfmt::skip]
const RESTORE_SEQUENCE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1002l\x1b[?1000l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static HOOK: Once = Once::new();

/// Wrap the current panic hook so the terminal is restored before the
/// panic message prints. Installed once per process, on first `enter()`.
fn hook_panics() {
    HOOK.call_once(|| {
        let inner = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_sequence();

            #[cfg(unix)]
            if let Ok(guard) = SAVED_TERMIOS.lock() {
                if let Some(saved) = guard.as_ref() {
                    let _ = raw_mode_off(saved);
                }
            }

            inner(info);
        }));
    });
}

/// Push [`RESTORE_SEQUENCE`] to fd 1 without touching the stdout lock.
fn write_restore_sequence() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            RESTORE_SEQUENCE.as_ptr().cast::<libc::c_void>(),
            RESTORE_SEQUENCE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(RESTORE_SEQUENCE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the switch into and out of full-screen mode.
///
/// [`enter`](Self::enter) turns on raw mode, the alternate screen, and
/// mouse reporting; [`leave`](Self::leave) undoes all of it. Both are
/// idempotent, and drop calls `leave` if it is still owed.
pub struct Terminal {
    #[cfg(unix)]
    saved: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Query the size and build an inactive handle.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` keeps room for platforms whose
    /// console setup can fail.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            saved: None,
            size: query_size().unwrap_or(FALLBACK_SIZE),
            active: false,
        })
    }

    /// The size as of the last query.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Ask the kernel again; call on SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = query_size() {
            self.size = size;
        }
        self.size
    }

    /// Whether `enter()` has been called without a matching `leave()`.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Switch to full-screen mode: raw stdin, alternate screen, hidden
    /// cursor, mouse reporting. No-op while already active.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the mode-switch writes fail.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        hook_panics();

        #[cfg(unix)]
        if is_tty() {
            let saved = raw_mode_on()?;
            self.saved = Some(saved);
            if let Ok(mut guard) = SAVED_TERMIOS.lock() {
                *guard = Some(saved);
            }
        }

        let mut out = io::stdout().lock();
        out.write_all(seq::ALT_SCREEN_ON)?;
        out.write_all(seq::HIDE_CURSOR)?;
        out.write_all(seq::CLEAR_SCREEN)?;
        out.write_all(seq::MOUSE_ON)?;
        out.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). No-op while inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the restore writes or termios restore fail.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        {
            let mut out = io::stdout().lock();
            out.write_all(seq::SYNC_OFF)?;
            out.write_all(seq::MOUSE_OFF)?;
            out.write_all(seq::SGR_RESET)?;
            out.write_all(seq::SHOW_CURSOR)?;
            out.write_all(seq::ALT_SCREEN_OFF)?;
            out.flush()?;
        }

        #[cfg(unix)]
        if let Some(saved) = self.saved.take() {
            raw_mode_off(&saved)?;
            if let Ok(mut guard) = SAVED_TERMIOS.lock() {
                *guard = None;
            }
        }

        self.active = false;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Stdin reader thread.
//
// Raw-mode reads block, and the main thread cannot afford to: it has
// frames to render and a resize flag to poll. So a worker thread does
// the blocking and forwards whatever bytes arrive over an mpsc channel,
// leaving the main loop free to `recv_timeout`.
//
// The worker never blocks indefinitely either — it waits on `poll()`
// in short slices and checks a quit flag in between, so `stop()` always
// returns promptly instead of waiting for the user to press a key.
#![allow(unsafe_code)]

#[cfg(unix)]
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Upper bound for one read. Keypresses are a few bytes; a burst of
/// mouse drag reports is the realistic worst case and fits easily.
const CHUNK: usize = 2048;

/// How long one `poll()` slice lasts. Bounds how stale the quit flag
/// can get, i.e. the worst-case shutdown latency.
const POLL_SLICE_MS: i32 = 25;

/// Handle to the stdin worker thread.
///
/// Created with [`spawn`](Self::spawn), which also hands back the
/// receiving end of the byte channel. The channel closes when the
/// worker exits — on [`stop`](Self::stop), on EOF, or when the
/// receiver is dropped.
pub struct StdinReader {
    worker: Option<JoinHandle<()>>,
    quit: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start the worker and return it together with the byte channel.
    /// Every received `Vec<u8>` is one non-empty read from stdin.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a thread.
    #[must_use]
    pub fn spawn() -> (Self, Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let quit = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&quit);
        let worker = thread::Builder::new()
            .name("stdin".into())
            .spawn(move || forward_stdin(&tx, &flag))
            .expect("spawning the stdin thread failed");

        (
            Self {
                worker: Some(worker),
                quit,
            },
            rx,
        )
    }

    /// Tell the worker to exit and join it. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.quit.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Worker loop ────────────────────────────────────────────────────────────

/// Shovel stdin bytes into the channel until told to quit, stdin ends,
/// or nobody is listening anymore.
#[cfg(unix)]
fn forward_stdin(tx: &Sender<Vec<u8>>, quit: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; CHUNK];

    while !quit.load(Ordering::Relaxed) {
        if !readable_within(fd, POLL_SLICE_MS) {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let Ok(n) = usize::try_from(n) else {
            break; // read error
        };
        if n == 0 {
            break; // EOF
        }

        if tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

/// Wait up to `ms` milliseconds for `fd` to become readable.
#[cfg(unix)]
fn readable_within(fd: i32, ms: i32) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    unsafe { libc::poll(&raw mut pfd, 1, ms) > 0 }
}

/// Without `poll()`, fall back to plain blocking reads. Shutdown then
/// waits for the read in flight, which is the best we can do here.
#[cfg(not(unix))]
fn forward_stdin(tx: &Sender<Vec<u8>>, quit: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; CHUNK];

    while !quit.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Stdin is not a terminal under `cargo test`; these exercise the
    // lifecycle, not actual input.

    #[test]
    fn spawn_then_stop_returns() {
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
    }

    #[test]
    fn stop_twice_is_fine() {
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn dropping_joins_the_worker() {
        let (reader, _rx) = StdinReader::spawn();
        drop(reader);
    }

    #[test]
    fn channel_disconnects_once_stopped() {
        let (mut reader, rx) = StdinReader::spawn();
        reader.stop();

        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}

// SPDX-License-Identifier: MIT
//
// Input decoding — stdin bytes to key and mouse events.
//
// The byte stream carries several encodings at once: plain ASCII and
// UTF-8 for characters, control bytes for Ctrl chords, CSI and SS3
// sequences for the arrows, and SGR reports for the mouse. One decoder
// handles all of them, one event at a time, from the front of a small
// carry-over buffer.
//
// The buffer exists because a sequence can straddle two reads: the
// decoder answers "not enough bytes yet" and the remainder waits for
// the next chunk. A lone ESC is the awkward case — indistinguishable
// from a sequence that hasn't finished arriving — so it stays pending
// until the caller decides enough time has passed and calls `flush`.

use bitflags::bitflags;

// ─── Events ─────────────────────────────────────────────────────────────────

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keypress.
    Key(KeyEvent),
    /// A mouse report.
    Mouse(MouseEvent),
}

/// A keypress with its modifiers. Terminals only report presses, so
/// there is nothing more to say about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key itself.
    pub code: KeyCode,
    /// Modifiers held during the press.
    pub modifiers: Modifiers,
}

/// The keys the editor distinguishes. Printable input is [`Char`]
/// (including uppercase — shift arrives pre-applied by the terminal).
///
/// [`Char`]: KeyCode::Char
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

bitflags! {
    /// Modifier keys, in the xterm CSI encoding (`parameter − 1`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

/// A mouse report: what happened and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Press, release, drag, move, or wheel.
    pub kind: MouseEventKind,
    /// Column, 0-based.
    pub x: u16,
    /// Row, 0-based.
    pub y: u16,
    /// Modifiers held during the event.
    pub modifiers: Modifiers,
}

/// The kinds of mouse report SGR tracking delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    /// Movement with `button` held down.
    Drag(MouseButton),
    /// Movement with nothing held.
    Move,
    ScrollUp,
    ScrollDown,
}

/// Which physical button a report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental input decoder.
///
/// Feed byte chunks to [`advance`](Parser::advance) as they arrive and
/// collect events. When a read timeout fires with bytes still pending,
/// call [`flush`](Parser::flush) to settle the ESC ambiguity: whatever
/// is buffered is decoded as literal keys, a lone ESC becoming a real
/// Escape press.
pub struct Parser {
    pending: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(64),
        }
    }

    /// Decode as many complete events as `bytes` (plus anything carried
    /// over) allows. Incomplete trailing sequences stay buffered.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut used = 0;

        while used < self.pending.len() {
            match decode(&self.pending[used..]) {
                Step::Emit(event, n) => {
                    events.push(event);
                    used += n;
                }
                Step::Junk(n) => used += n,
                Step::Starved => break,
            }
        }

        self.pending.drain(..used);
        events
    }

    /// Whether bytes are waiting for a sequence to complete.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Give up on the pending bytes completing a sequence and decode
    /// them as individual keys instead.
    pub fn flush(&mut self) -> Vec<Event> {
        let held = std::mem::take(&mut self.pending);
        let mut events = Vec::new();

        for &byte in &held {
            let event = match byte {
                0x1B => plain(KeyCode::Escape),
                b'\r' | b'\n' => plain(KeyCode::Enter),
                0x08 | 0x7F => plain(KeyCode::Backspace),
                c @ 0x01..=0x1A => ctrl_letter(c),
                c @ 0x20..=0x7E => plain(KeyCode::Char(c as char)),
                _ => continue,
            };
            events.push(event);
        }

        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Outcome of decoding at the front of the buffer.
enum Step {
    /// An event, and how many bytes it took.
    Emit(Event, usize),
    /// Bytes to discard (unknown or malformed sequence).
    Junk(usize),
    /// The buffer ends mid-sequence; wait for more bytes.
    Starved,
}

/// Decode one event from the front of `bytes`. `bytes` is non-empty.
fn decode(bytes: &[u8]) -> Step {
    match bytes[0] {
        0x1B => decode_escape(bytes),
        b'\r' | b'\n' => Step::Emit(plain(KeyCode::Enter), 1),
        b'\t' => Step::Emit(plain(KeyCode::Tab), 1),
        0x08 | 0x7F => Step::Emit(plain(KeyCode::Backspace), 1),
        c @ 0x01..=0x1A => Step::Emit(ctrl_letter(c), 1),
        c @ 0x20..=0x7E => Step::Emit(plain(KeyCode::Char(c as char)), 1),
        0xC2..=0xF4 => decode_utf8(bytes),
        // Stray control bytes and misplaced UTF-8 continuations.
        _ => Step::Junk(1),
    }
}

/// After an ESC: a sequence introducer, an Alt chord, or Escape itself.
fn decode_escape(bytes: &[u8]) -> Step {
    let Some(&second) = bytes.get(1) else {
        // Lone ESC; `flush` resolves it if nothing follows.
        return Step::Starved;
    };

    match second {
        b'[' => decode_csi(bytes),
        b'O' => decode_ss3(bytes),
        0x1B => Step::Emit(keyed(KeyCode::Escape, Modifiers::ALT), 2),
        c @ 0x20..=0x7E => Step::Emit(keyed(KeyCode::Char(c as char), Modifiers::ALT), 2),
        c @ 0x01..=0x1A => Step::Emit(
            keyed(
                KeyCode::Char((c - 1 + b'a') as char),
                Modifiers::ALT.union(Modifiers::CTRL),
            ),
            2,
        ),
        _ => Step::Emit(plain(KeyCode::Escape), 1),
    }
}

/// `ESC [` sequences: the arrows (with optional modifier parameter),
/// plus the mouse reports. Recognized arrows become events; every other
/// well-formed sequence is consumed and dropped.
fn decode_csi(bytes: &[u8]) -> Step {
    if bytes.get(2) == Some(&b'<') {
        return decode_mouse(bytes);
    }

    // Walk to the final byte. Parameters are 0x30..=0x3F, intermediates
    // 0x20..=0x2F, the final byte 0x40..=0x7E.
    let mut i = 2;
    let fin = loop {
        match bytes.get(i) {
            None => return Step::Starved,
            Some(&b) if (0x40..=0x7E).contains(&b) => break b,
            Some(&b) if (0x20..=0x3F).contains(&b) => i += 1,
            Some(_) => return Step::Junk(i + 1),
        }
    };
    let used = i + 1;

    let code = match fin {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        _ => return Step::Junk(used),
    };

    Step::Emit(keyed(code, csi_modifiers(&bytes[2..i])), used)
}

/// `ESC O` arrows — the application-cursor-mode encoding some
/// terminals use even without being asked.
fn decode_ss3(bytes: &[u8]) -> Step {
    let Some(&fin) = bytes.get(2) else {
        return Step::Starved;
    };

    let code = match fin {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        _ => return Step::Junk(3),
    };

    Step::Emit(plain(code), 3)
}

/// `ESC [ < flags ; column ; row` ending in `M` (press or motion) or
/// `m` (release). Coordinates arrive 1-based and leave 0-based.
fn decode_mouse(bytes: &[u8]) -> Step {
    let mut i = 3;
    let fin = loop {
        match bytes.get(i) {
            None => return Step::Starved,
            Some(&b @ (b'M' | b'm')) => break b,
            Some(&b) if b.is_ascii_digit() || b == b';' => i += 1,
            Some(_) => return Step::Junk(i + 1),
        }
    };
    let used = i + 1;

    let mut scan = Scan::new(&bytes[3..i]);
    let flags = scan.number().unwrap_or(0);
    scan.eat(b';');
    let column = scan.number().unwrap_or(0);
    scan.eat(b';');
    let row = scan.number().unwrap_or(0);

    let mut modifiers = Modifiers::empty();
    if flags & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if flags & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if flags & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let button = flags & 3;
    let kind = if flags & 64 != 0 {
        // Wheel. Horizontal ticks fold into the vertical axis; the
        // editor has nothing horizontal to scroll.
        if button == 0 || button == 2 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if flags & 32 != 0 {
        match held_button(button) {
            Some(b) => MouseEventKind::Drag(b),
            None => MouseEventKind::Move,
        }
    } else if fin == b'm' {
        MouseEventKind::Release(held_button(button).unwrap_or(MouseButton::Left))
    } else {
        MouseEventKind::Press(held_button(button).unwrap_or(MouseButton::Left))
    };

    Step::Emit(
        Event::Mouse(MouseEvent {
            kind,
            x: column.saturating_sub(1),
            y: row.saturating_sub(1),
            modifiers,
        }),
        used,
    )
}

/// Multi-byte UTF-8; the lead byte is a valid one (0xC2..=0xF4).
fn decode_utf8(bytes: &[u8]) -> Step {
    let want = match bytes[0] {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };

    if bytes.len() < want {
        return Step::Starved;
    }

    match std::str::from_utf8(&bytes[..want]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Step::Emit(plain(KeyCode::Char(ch)), want),
            None => Step::Junk(want),
        },
        Err(_) => Step::Junk(1),
    }
}

// ─── Scan ───────────────────────────────────────────────────────────────────

/// Tiny cursor over the parameter bytes of a sequence.
struct Scan<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scan<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read a decimal number. `None` when the next byte is not a digit.
    fn number(&mut self) -> Option<u16> {
        let start = self.pos;
        let mut value: u16 = 0;
        while let Some(&b) = self.bytes.get(self.pos) {
            if !b.is_ascii_digit() {
                break;
            }
            value = value.saturating_mul(10).saturating_add(u16::from(b - b'0'));
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    /// Consume `byte` if it is next.
    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn plain(code: KeyCode) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers: Modifiers::empty(),
    })
}

const fn keyed(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// A control byte 0x01..=0x1A as its Ctrl+letter chord.
const fn ctrl_letter(byte: u8) -> Event {
    keyed(KeyCode::Char((byte - 1 + b'a') as char), Modifiers::CTRL)
}

/// Modifiers from a CSI parameter list like `1;5`: the second number
/// is one more than the modifier bitmask.
fn csi_modifiers(params: &[u8]) -> Modifiers {
    let mut scan = Scan::new(params);
    let _ = scan.number();
    if !scan.eat(b';') {
        return Modifiers::empty();
    }
    match scan.number() {
        Some(n) if n > 0 => {
            u8::try_from((n - 1) & 0x07).map_or(Modifiers::empty(), Modifiers::from_bits_truncate)
        }
        _ => Modifiers::empty(),
    }
}

const fn held_button(code: u16) -> Option<MouseButton> {
    match code {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn events(bytes: &[u8]) -> Vec<Event> {
        Parser::new().advance(bytes)
    }

    fn only(bytes: &[u8]) -> Event {
        let got = events(bytes);
        assert_eq!(got.len(), 1, "wanted exactly one event, got {got:?}");
        got[0]
    }

    fn ch(c: char) -> Event {
        plain(KeyCode::Char(c))
    }

    // ── Printable input ─────────────────────────────────────────────────

    #[test]
    fn single_ascii_byte() {
        assert_eq!(only(b"a"), ch('a'));
        assert_eq!(only(b" "), ch(' '));
    }

    #[test]
    fn run_of_ascii_bytes() {
        assert_eq!(events(b"wasd"), [ch('w'), ch('a'), ch('s'), ch('d')]);
    }

    #[test]
    fn shift_arrives_as_uppercase() {
        assert_eq!(events(b"WD"), [ch('W'), ch('D')]);
    }

    #[test]
    fn multibyte_utf8() {
        assert_eq!(only("é".as_bytes()), ch('é'));
        assert_eq!(only("中".as_bytes()), ch('中'));
    }

    #[test]
    fn utf8_char_split_between_reads() {
        let bytes = "中".as_bytes();
        let mut parser = Parser::new();
        assert!(parser.advance(&bytes[..1]).is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(&bytes[1..]), [ch('中')]);
    }

    #[test]
    fn stray_continuation_byte_is_dropped() {
        assert_eq!(events(&[0x80, b'a']), [ch('a')]);
    }

    // ── Control bytes ───────────────────────────────────────────────────

    #[test]
    fn ctrl_chords() {
        assert_eq!(only(b"\x13"), keyed(KeyCode::Char('s'), Modifiers::CTRL));
        assert_eq!(only(b"\x03"), keyed(KeyCode::Char('c'), Modifiers::CTRL));
    }

    #[test]
    fn enter_in_both_line_endings() {
        assert_eq!(only(b"\r"), plain(KeyCode::Enter));
        assert_eq!(only(b"\n"), plain(KeyCode::Enter));
    }

    #[test]
    fn tab_and_backspace() {
        assert_eq!(only(b"\t"), plain(KeyCode::Tab));
        assert_eq!(only(b"\x08"), plain(KeyCode::Backspace));
        assert_eq!(only(b"\x7f"), plain(KeyCode::Backspace));
    }

    // ── Arrows ──────────────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(only(b"\x1b[A"), plain(KeyCode::Up));
        assert_eq!(only(b"\x1b[B"), plain(KeyCode::Down));
        assert_eq!(only(b"\x1b[C"), plain(KeyCode::Right));
        assert_eq!(only(b"\x1b[D"), plain(KeyCode::Left));
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(only(b"\x1bOA"), plain(KeyCode::Up));
        assert_eq!(only(b"\x1bOD"), plain(KeyCode::Left));
    }

    #[test]
    fn arrow_modifier_parameter() {
        assert_eq!(only(b"\x1b[1;2A"), keyed(KeyCode::Up, Modifiers::SHIFT));
        assert_eq!(only(b"\x1b[1;5C"), keyed(KeyCode::Right, Modifiers::CTRL));
    }

    #[test]
    fn unbound_csi_sequences_are_swallowed_whole() {
        // Page Up, then a letter. The sequence must not leak as chars.
        assert_eq!(events(b"\x1b[5~x"), [ch('x')]);
    }

    // ── Alt ─────────────────────────────────────────────────────────────

    #[test]
    fn alt_prefixed_char() {
        assert_eq!(only(b"\x1bt"), keyed(KeyCode::Char('t'), Modifiers::ALT));
    }

    #[test]
    fn double_esc_is_alt_escape() {
        assert_eq!(only(b"\x1b\x1b"), keyed(KeyCode::Escape, Modifiers::ALT));
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            x,
            y,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn press_and_release_differ_by_terminator() {
        let press = mouse(MouseEventKind::Press(MouseButton::Left), 9, 19);
        let release = mouse(MouseEventKind::Release(MouseButton::Left), 9, 19);
        assert_eq!(only(b"\x1b[<0;10;20M"), press);
        assert_eq!(only(b"\x1b[<0;10;20m"), release);
    }

    #[test]
    fn right_button_press() {
        assert_eq!(
            only(b"\x1b[<2;1;1M"),
            mouse(MouseEventKind::Press(MouseButton::Right), 0, 0)
        );
    }

    #[test]
    fn motion_with_button_is_a_drag() {
        assert_eq!(
            only(b"\x1b[<32;15;25M"),
            mouse(MouseEventKind::Drag(MouseButton::Left), 14, 24)
        );
        assert_eq!(
            only(b"\x1b[<34;15;25M"),
            mouse(MouseEventKind::Drag(MouseButton::Right), 14, 24)
        );
    }

    #[test]
    fn motion_without_button_is_a_move() {
        assert_eq!(only(b"\x1b[<35;15;25M"), mouse(MouseEventKind::Move, 14, 24));
    }

    #[test]
    fn wheel_ticks() {
        assert_eq!(only(b"\x1b[<64;10;20M"), mouse(MouseEventKind::ScrollUp, 9, 19));
        assert_eq!(only(b"\x1b[<65;10;20M"), mouse(MouseEventKind::ScrollDown, 9, 19));
    }

    #[test]
    fn shift_flag_on_a_click() {
        assert_eq!(
            only(b"\x1b[<4;10;10M"),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Press(MouseButton::Left),
                x: 9,
                y: 9,
                modifiers: Modifiers::SHIFT,
            })
        );
    }

    #[test]
    fn coordinates_past_the_x10_limit() {
        assert_eq!(
            only(b"\x1b[<0;300;150M"),
            mouse(MouseEventKind::Press(MouseButton::Left), 299, 149)
        );
    }

    #[test]
    fn mouse_report_split_between_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[<0;10").is_empty());
        let got = parser.advance(b";20M");
        assert_eq!(
            got,
            [mouse(MouseEventKind::Press(MouseButton::Left), 9, 19)]
        );
    }

    // ── Pending bytes and flush ─────────────────────────────────────────

    #[test]
    fn split_csi_resumes_on_next_chunk() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(b"A"), [plain(KeyCode::Up)]);
    }

    #[test]
    fn flush_turns_a_lone_esc_into_escape() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), [plain(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn flush_with_nothing_pending_is_empty() {
        assert!(Parser::new().flush().is_empty());
    }

    #[test]
    fn interleaved_keys_and_mouse() {
        let got = events(b"w\x1b[B\x1b[<0;3;5M ");
        assert_eq!(got.len(), 4);
        assert_eq!(got[0], ch('w'));
        assert_eq!(got[1], plain(KeyCode::Down));
        assert!(matches!(got[2], Event::Mouse(_)));
        assert_eq!(got[3], ch(' '));
    }
}

//! Terminal backends behind a single `Terminal` interface.
//!
//! - `CrosstermTerminal`: an interactive TTY, raw keystrokes via `crossterm`.
//! - `StreamTerminal`: any byte stream (piped stdin, in-memory scripts).
//!
//! The backend is chosen once at startup; the rest of the crate only sees the trait.

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{self, BufRead, Write};
use std::ops::{Deref, DerefMut};
use tracing::trace;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;
const BS: u8 = 0x08;
const ETX: u8 = 0x03;

/// Erases the character left of the cursor.
pub(crate) const ERASE_CHAR: &str = "\x08 \x08";

/// A decoded keystroke, as far as line reading is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Carriage return or newline.
    Enter,
    /// The cancel key (ESC).
    Cancel,
    Backspace,
    /// Ctrl-C.
    Interrupt,
    Char(char),
}

/// Input and output surface used by the menu engine.
pub trait Terminal {
    /// Reads one keystroke. `None` means the input has ended.
    fn read_key(&mut self) -> io::Result<Option<Key>>;

    /// Reads one line in normal (cooked) mode, without its terminator.
    /// `None` means the input has ended.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn enable_raw_mode(&mut self) -> io::Result<()>;

    fn disable_raw_mode(&mut self) -> io::Result<()>;

    /// Erases the visible content of the viewport.
    fn clear(&mut self) -> io::Result<()>;

    fn writer(&mut self) -> &mut dyn Write;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn read_key(&mut self) -> io::Result<Option<Key>> {
        (**self).read_key()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        (**self).enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        (**self).disable_raw_mode()
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }

    fn writer(&mut self) -> &mut dyn Write {
        (**self).writer()
    }
}

/// Reads a line key by key from `terminal`, echoing as it goes.
///
/// Enter accepts, backspace edits, the cancel key is ignored and Ctrl-C fails
/// with `ErrorKind::Interrupted`. Input ending on an empty buffer gives `None`.
pub fn read_echoed_line<T: Terminal + ?Sized>(terminal: &mut T) -> io::Result<Option<String>> {
    let mut buffer = String::new();
    loop {
        let Some(key) = terminal.read_key()? else {
            return Ok((!buffer.is_empty()).then_some(buffer));
        };

        match key {
            Key::Enter => {
                write!(terminal.writer(), "\r\n")?;
                terminal.writer().flush()?;
                return Ok(Some(buffer));
            },
            Key::Interrupt => {
                write!(terminal.writer(), "\r\n")?;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            },
            Key::Cancel => {},
            Key::Backspace => {
                if buffer.pop().is_some() {
                    write!(terminal.writer(), "{}", ERASE_CHAR)?;
                }
            },
            Key::Char(ch) => {
                buffer.push(ch);
                write!(terminal.writer(), "{}", ch)?;
            },
        }
        terminal.writer().flush()?;
    }
}

/// Raw mode lifetime guard so terminal state is restored on any return path.
pub struct RawModeGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
}

impl<'a, T: Terminal + ?Sized> RawModeGuard<'a, T> {
    /// Enable raw mode and return a guard that disables it on drop.
    pub fn acquire(terminal: &'a mut T) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        Ok(Self { terminal })
    }
}

impl<T: Terminal + ?Sized> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.terminal.disable_raw_mode();
    }
}

/// Interactive terminal backed by `crossterm`.
///
/// Lines and prompts are both read from crossterm's event queue, so keys typed
/// ahead are never split between two readers.
pub struct CrosstermTerminal {
    stdout: io::Stdout,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn read_key(&mut self) -> io::Result<Option<Key>> {
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                continue;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            let mapped = match key.code {
                KeyCode::Enter => Key::Enter,
                KeyCode::Esc => Key::Cancel,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Char('c') if ctrl => Key::Interrupt,
                KeyCode::Char('d') if ctrl => return Ok(None),
                KeyCode::Char(ch) => Key::Char(ch),
                other => {
                    trace!(?other, "Ignoring key");
                    continue;
                },
            };
            return Ok(Some(mapped));
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = RawModeGuard::acquire(self)?;
        read_echoed_line(&mut *raw)
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
}

/// Terminal over plain byte streams, used for piped input and in tests.
///
/// `\r` and `\n` both accept a line; a `\n` directly after an accepting `\r`
/// is swallowed so CR and CR+LF input behave the same. Clearing is a no-op.
pub struct StreamTerminal<R, W> {
    input: R,
    output: W,
    raw: bool,
    after_cr: bool,
}

impl<R: BufRead, W: Write> StreamTerminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            raw: false,
            after_cr: false,
        }
    }

    /// Whether raw mode is currently (nominally) enabled.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let byte = {
                let buf = self.input.fill_buf()?;
                match buf.first() {
                    Some(&b) => b,
                    None => return Ok(None),
                }
            };
            self.input.consume(1);
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }
            return Ok(Some(byte));
        }
    }

    fn decode_char(&mut self, lead: u8) -> io::Result<char> {
        let width = match lead {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };
        let mut bytes = vec![lead];
        for _ in 1..width {
            // Only continuation bytes belong to this char; anything else is
            // left in the stream for the next read.
            let next = self.input.fill_buf()?.first().copied();
            match next {
                Some(b @ 0x80..=0xbf) => {
                    self.input.consume(1);
                    bytes.push(b);
                },
                _ => return Ok(char::REPLACEMENT_CHARACTER),
            }
        }
        Ok(std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

impl<R: BufRead, W: Write> Terminal for StreamTerminal<R, W> {
    fn read_key(&mut self) -> io::Result<Option<Key>> {
        let Some(byte) = self.next_byte()? else {
            return Ok(None);
        };
        let key = match byte {
            b'\r' => {
                self.after_cr = true;
                Key::Enter
            },
            b'\n' => Key::Enter,
            ESC => Key::Cancel,
            DEL | BS => Key::Backspace,
            ETX => Key::Interrupt,
            lead => Key::Char(self.decode_char(lead)?),
        };
        Ok(Some(key))
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();
        let mut terminated = false;
        while let Some(byte) = self.next_byte()? {
            match byte {
                b'\r' => {
                    self.after_cr = true;
                    terminated = true;
                    break;
                },
                b'\n' => {
                    terminated = true;
                    break;
                },
                other => bytes.push(other),
            }
        }
        if !terminated && bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        self.raw = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        self.raw = false;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(input: &str) -> StreamTerminal<Cursor<Vec<u8>>, Vec<u8>> {
        StreamTerminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_decodes_control_keys() {
        let mut term = stream("a\x7f\x08\x1b\x03\n");
        let mut keys = Vec::new();
        while let Some(key) = term.read_key().unwrap() {
            keys.push(key);
        }
        assert_eq!(
            keys,
            vec![
                Key::Char('a'),
                Key::Backspace,
                Key::Backspace,
                Key::Cancel,
                Key::Interrupt,
                Key::Enter,
            ]
        );
    }

    #[test]
    fn test_decodes_multibyte_chars() {
        let mut term = stream("é€");
        assert_eq!(term.read_key().unwrap(), Some(Key::Char('é')));
        assert_eq!(term.read_key().unwrap(), Some(Key::Char('€')));
        assert_eq!(term.read_key().unwrap(), None);
    }

    #[test]
    fn test_truncated_multibyte_char_keeps_following_control_key() {
        let mut term = StreamTerminal::new(Cursor::new(b"\xc3\nx\xe2\x82\x1b".to_vec()), Vec::new());
        assert_eq!(
            term.read_key().unwrap(),
            Some(Key::Char(char::REPLACEMENT_CHARACTER))
        );
        assert_eq!(term.read_key().unwrap(), Some(Key::Enter));
        assert_eq!(term.read_key().unwrap(), Some(Key::Char('x')));
        assert_eq!(
            term.read_key().unwrap(),
            Some(Key::Char(char::REPLACEMENT_CHARACTER))
        );
        assert_eq!(term.read_key().unwrap(), Some(Key::Cancel));
        assert_eq!(term.read_key().unwrap(), None);
    }

    #[test]
    fn test_crlf_counts_as_one_enter() {
        let mut term = stream("\r\n\r\n");
        assert_eq!(term.read_key().unwrap(), Some(Key::Enter));
        assert_eq!(term.read_key().unwrap(), Some(Key::Enter));
        assert_eq!(term.read_key().unwrap(), None);
    }

    #[test]
    fn test_read_line_handles_all_terminators() {
        let mut term = stream("one\r\ntwo\rthree\nfour");
        assert_eq!(term.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(term.read_line().unwrap().as_deref(), Some("two"));
        assert_eq!(term.read_line().unwrap().as_deref(), Some("three"));
        assert_eq!(term.read_line().unwrap().as_deref(), Some("four"));
        assert_eq!(term.read_line().unwrap(), None);
    }

    #[test]
    fn test_empty_line_is_not_eof() {
        let mut term = stream("\n");
        assert_eq!(term.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(term.read_line().unwrap(), None);
    }

    #[test]
    fn test_echoed_line_leaves_type_ahead_for_next_read() {
        let mut term = stream("1\x1b2\x7f\nab");
        assert_eq!(read_echoed_line(&mut term).unwrap().as_deref(), Some("1"));
        assert_eq!(term.read_key().unwrap(), Some(Key::Char('a')));
        assert_eq!(String::from_utf8_lossy(term.output()), "12\x08 \x08\r\n");
    }

    #[test]
    fn test_echoed_line_interrupt_and_eof() {
        let mut term = stream("x\x03");
        let err = read_echoed_line(&mut term).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);

        assert_eq!(read_echoed_line(&mut stream("")).unwrap(), None);
        assert_eq!(read_echoed_line(&mut stream("tail")).unwrap().as_deref(), Some("tail"));
    }

    #[test]
    fn test_raw_mode_guard_restores_on_drop() {
        let mut term = stream("");
        {
            let guard = RawModeGuard::acquire(&mut term).unwrap();
            assert!(guard.is_raw());
        }
        assert!(!term.is_raw());
    }
}

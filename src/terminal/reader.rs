//! Cancelable line input read keystroke by keystroke in raw mode.

use super::backend::{Key, RawModeGuard, Terminal, ERASE_CHAR};
use crate::error::{MenuError, Result};
use tracing::debug;

/// Reads one line, echoing as it goes, and lets the user cancel with ESC.
///
/// Raw mode is held only for the duration of the call and released on every
/// exit path. An empty line is a valid answer.
///
/// # Errors
///
/// * `MenuError::PromptCancelled` - ESC was pressed (a notice has been printed).
/// * `MenuError::Interrupted` - Ctrl-C was pressed.
/// * `MenuError::EndOfInput` - the input ended before Enter.
pub fn read_cancelable<T>(terminal: &mut T, prompt: &str) -> Result<String>
where
    T: Terminal + ?Sized,
{
    write!(terminal.writer(), "{}", prompt)?;
    terminal.writer().flush()?;

    let mut raw = RawModeGuard::acquire(terminal)?;
    let mut buffer = String::new();

    loop {
        let Some(key) = raw.read_key()? else {
            write!(raw.writer(), "\r\n")?;
            return Err(MenuError::EndOfInput);
        };

        match key {
            Key::Enter => {
                write!(raw.writer(), "\r\n")?;
                raw.writer().flush()?;
                return Ok(buffer);
            },
            Key::Cancel => {
                write!(raw.writer(), "\r\nInput cancelled.\r\n")?;
                raw.writer().flush()?;
                debug!(prompt, "Prompt cancelled");
                return Err(MenuError::PromptCancelled);
            },
            Key::Interrupt => {
                write!(raw.writer(), "\r\n")?;
                return Err(MenuError::Interrupted);
            },
            Key::Backspace => {
                if buffer.pop().is_some() {
                    write!(raw.writer(), "{}", ERASE_CHAR)?;
                }
            },
            Key::Char(ch) => {
                buffer.push(ch);
                write!(raw.writer(), "{}", ch)?;
            },
        }
        raw.writer().flush()?;
    }
}

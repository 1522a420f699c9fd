//! Defines the menu engine's primary error type `MenuError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition. Every recoverable
//! variant's `Display` text is exactly the notice printed to the user, so the
//! run loop can report an error by formatting it.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `MenuError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all menu-engine errors.
#[derive(Error, Debug, Clone)]
pub enum MenuError {
    /// The selection was not a number in `1..=max`.
    #[error("Invalid selection - please try again.")]
    InvalidSelection { input: String, max: usize },

    /// The user pressed the cancel key while a prompt was being answered.
    #[error("Input cancelled.")]
    PromptCancelled,

    /// Prompt text could not be converted to the declared type.
    #[error("Invalid input '{input}' - expected {expected}.")]
    PromptConversion { input: String, expected: &'static str },

    /// The invoked action returned an error or panicked.
    #[error("Error while executing '{label}': {message}")]
    ActionExecution { label: String, message: String },

    /// A table record does not have one field per column label.
    #[error("Cannot render table: expected {expected} columns but the first record has {found} fields.")]
    TableShapeMismatch { expected: usize, found: usize },

    /// An action was configured inconsistently (checked when the engine is built).
    #[error("Invalid action configuration: {0}")]
    InvalidAction(String),

    /// The user interrupted the session (Ctrl-C while reading a prompt).
    #[error("Interrupted.")]
    Interrupted,

    /// Input ended (EOF) while the engine was waiting for the user.
    #[error("End of input.")]
    EndOfInput,

    /// Error related to standard I/O operations on the terminal.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),
}

impl MenuError {
    /// Returns `true` for errors that are reported and then lead back to the menu.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            MenuError::Interrupted | MenuError::EndOfInput | MenuError::Io(_)
        )
    }
}

/// A specialized `Result` type using the engine's `MenuError`.
pub type Result<T> = std::result::Result<T, MenuError>;

// --- From implementations ---

impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        // Ctrl-C during a line read surfaces as an `Interrupted` I/O error.
        if err.kind() == std::io::ErrorKind::Interrupted {
            return MenuError::Interrupted;
        }
        MenuError::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_names_expected_type() {
        let err = MenuError::PromptConversion {
            input: "abc".to_string(),
            expected: "integer",
        };
        assert_eq!(err.to_string(), "Invalid input 'abc' - expected integer.");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_action_error_mentions_label() {
        let err = MenuError::ActionExecution {
            label: "Add Two Numbers".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Error while executing 'Add Two Numbers': boom");
    }

    #[test]
    fn test_io_errors_are_fatal() {
        let err: MenuError = std::io::Error::new(std::io::ErrorKind::Other, "gone").into();
        assert!(!err.is_recoverable());
        assert!(!MenuError::Interrupted.is_recoverable());
        assert!(!MenuError::EndOfInput.is_recoverable());
    }

    #[test]
    fn test_interrupted_io_maps_to_interrupted() {
        let err: MenuError = std::io::Error::from(std::io::ErrorKind::Interrupted).into();
        assert!(matches!(err, MenuError::Interrupted));
    }
}

//! A reusable numbered console menu.
//!
//! Give a `MenuEngine` a list of [`Action`]s and a terminal; it renders the
//! menu, reads a selection, asks for any prompted arguments (ESC cancels),
//! calls the action and prints its result either as text or as a table.

pub mod error;
pub mod menu;
pub mod models;
pub mod render;
pub mod terminal;

pub use error::{MenuError, Result};
pub use menu::{MenuConfig, MenuEngine};
pub use models::{Action, Arguments, DisplayMode, PromptSpec, ValueKind};
pub use terminal::{read_cancelable, CrosstermTerminal, StreamTerminal, Terminal};

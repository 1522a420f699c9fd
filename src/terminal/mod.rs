//! Terminal input and output.
//!
//! Includes:
//! - `backend`: the `Terminal` trait, its crossterm and stream backends, and `RawModeGuard`.
//! - `reader`: `read_cancelable`, the ESC-cancelable raw line reader.

mod backend;
mod reader;

pub use backend::*;
pub use reader::*;

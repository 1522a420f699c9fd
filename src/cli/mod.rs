//! Handles Command Line Interface (CLI) related functionalities for the demo binary.
//!
//! Includes parsing arguments and environment fallbacks into a `MenuConfig`,
//! and the demo actions shown in the menu.

mod args;
mod demo;

pub use args::*;
pub use demo::*;

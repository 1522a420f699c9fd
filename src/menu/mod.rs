//! The interactive menu engine.
//!
//! Includes:
//! - `config`: presentation settings (`MenuConfig`).
//! - `engine`: `MenuEngine` and its select, prompt, invoke and render loop.

mod config;
mod engine;
#[cfg(test)]
mod engine_test;

pub use config::*;
pub use engine::*;

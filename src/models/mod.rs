//! Defines the data structures used to describe a menu.
//!
//! This covers menu entries, their static and prompted arguments, the prompt
//! conversion table and the display mode of each entry's result.

mod action;

pub use action::*;

//! Rendering of action results.
//!
//! Currently, this module focuses on fixed-width tables via the `table` submodule.

mod table;

pub use table::*;

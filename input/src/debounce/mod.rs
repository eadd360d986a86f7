//! Debouncing of mechanical switch inputs.

mod timed;

pub use timed::*;

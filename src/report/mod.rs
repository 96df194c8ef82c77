//! Reporting utilities: per-segment fit summaries for the terminal.

pub mod format;

pub use format::*;

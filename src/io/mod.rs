//! Input/output helpers.
//!
//! - CSV tables: loading, column checks, tagged concatenation (`table`)
//! - result exports (JSON/CSV) (`export`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;

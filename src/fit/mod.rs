//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - split measurements by the sign of the applied torque
//! - fit one line per side and keep the points each line was fitted on

pub mod segments;

pub use segments::*;

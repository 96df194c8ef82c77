//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the measurement column names the stiffness workflow relies on
//! - which side of the torque axis a fit covers (`Side`)
//! - chart decoration shared by config and rendering (`ChartStyle`, `Rgb`)

pub mod types;

pub use types::*;

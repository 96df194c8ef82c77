//! `actuator-plots` library crate.
//!
//! The binary (`actuator`) is a thin wrapper around this library so that:
//!
//! - loading, fitting and chart building are testable without a terminal
//! - the stiffness and comparison workflows share one table/plot stack

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;

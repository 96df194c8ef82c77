//! Command-line parsing for the actuator analysis tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading/fitting/plotting code. Flags only override the study configuration;
//! `app` merges the two.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ChartStyle;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "actuator", version, about = "Actuator transmission analysis plots")]
pub struct Cli {
    /// Study configuration (TOML). Built-in defaults are used when omitted.
    #[arg(long, global = true, value_name = "TOML", env = "ACTUATOR_PLOTS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plot deflection vs. torque, fit each torque direction, print stiffness.
    ///
    /// The chart opens in the terminal; press `q` or `Esc` to close it. The fit
    /// summary is printed after the chart is closed.
    Stiffness(StiffnessArgs),
    /// Plot the gearbox design sweeps side by side.
    Compare(CompareArgs),
    /// Print the built-in study configuration as TOML.
    Config,
}

/// Chart decoration overrides shared by both workflows.
#[derive(Debug, Args, Clone, Default)]
pub struct StyleArgs {
    /// Axis label font size.
    #[arg(long, value_name = "PT")]
    pub axis_label_size: Option<u32>,

    /// Tick label font size.
    #[arg(long, value_name = "PT")]
    pub tick_label_size: Option<u32>,

    /// Legend font size.
    #[arg(long, value_name = "PT")]
    pub legend_size: Option<u32>,

    /// Line width.
    #[arg(long, value_name = "W")]
    pub line_width: Option<f64>,
}

impl StyleArgs {
    pub fn apply(&self, style: &mut ChartStyle) {
        if let Some(v) = self.axis_label_size {
            style.axis_label_size = v;
        }
        if let Some(v) = self.tick_label_size {
            style.tick_label_size = v;
        }
        if let Some(v) = self.legend_size {
            style.legend_size = v;
        }
        if let Some(v) = self.line_width {
            style.line_width = v;
        }
    }
}

/// Options for the stiffness workflow.
#[derive(Debug, Args, Clone)]
pub struct StiffnessArgs {
    /// Measurement CSVs, one per configured series and in the same order
    /// (default: SSPG then CPG).
    #[arg(value_name = "CSV")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Export the fitted segments to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for the comparison workflow.
#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Design sweep CSVs, one per configured source and in the same order
    /// (default: CPG, DSPG, SSPG, WPG).
    #[arg(value_name = "CSV")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Export the combined, labelled table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

//! Shared workflow logic, independent of how results are presented.
//!
//! Keeping this in one place keeps the core workflows testable:
//! - stiffness: load tables -> check columns -> scale deflection -> fit each side
//! - comparison: load tables -> tag + concatenate -> group each metric by source
//!
//! The CLI front-end then only decides what to print, show and export.

use std::collections::BTreeMap;

use crate::config::{ComparisonConfig, StiffnessConfig};
use crate::domain::{ENCODER_POS_COLUMN, OUTPUT_TORQUE_COLUMN, Rgb, STIFFNESS_COLUMNS, Side};
use crate::error::AppError;
use crate::fit::{Segment, fit_both_sides};
use crate::io::{Table, TableError, check_required_columns};

/// One transmission's measurement and its two fits.
#[derive(Debug, Clone)]
pub struct MeasuredSeries {
    pub name: String,
    pub gear_ratio: f64,
    pub color: Rgb,
    /// Applied output torque (Nm), the independent variable.
    pub torque: Vec<f64>,
    /// Output-side deflection (rad): encoder position divided by the ratio.
    pub deflection: Vec<f64>,
    /// `[positive, negative]` torque fits.
    pub segments: [Segment; 2],
}

impl MeasuredSeries {
    /// Legend text, e.g. `SSPG (7.2:1)`.
    pub fn legend_label(&self) -> String {
        format!("{} ({}:1)", self.name, self.gear_ratio)
    }

    pub fn segment(&self, side: Side) -> &Segment {
        match side {
            Side::Positive => &self.segments[0],
            Side::Negative => &self.segments[1],
        }
    }
}

/// All computed outputs of a stiffness run.
#[derive(Debug, Clone)]
pub struct StiffnessRun {
    pub series: Vec<MeasuredSeries>,
}

/// Load every configured measurement file and fit it.
pub fn run_stiffness(config: &StiffnessConfig) -> Result<StiffnessRun, AppError> {
    let tables = config
        .series
        .iter()
        .map(|s| Table::from_path(&s.path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stiffness_from_tables(config, &tables)?)
}

/// Fit already-loaded tables; `tables[i]` belongs to `config.series[i]`.
pub fn stiffness_from_tables(config: &StiffnessConfig, tables: &[Table]) -> Result<StiffnessRun, TableError> {
    check_required_columns(tables, &STIFFNESS_COLUMNS)?;

    let mut series = Vec::with_capacity(tables.len());
    for (cfg, table) in config.series.iter().zip(tables) {
        let torque = table.numeric_column(OUTPUT_TORQUE_COLUMN)?;
        let deflection: Vec<f64> = table
            .numeric_column(ENCODER_POS_COLUMN)?
            .into_iter()
            .map(|pos| pos / cfg.gear_ratio)
            .collect();
        check_fit_rows(table, &torque, &deflection)?;

        let segments = fit_both_sides(&torque, &deflection);
        for segment in &segments {
            match &segment.fit {
                Some(fit) => log::info!(
                    "{} ({}): n={} slope={:.6} r2={:.4}",
                    cfg.name,
                    segment.side.symbol(),
                    fit.n,
                    fit.slope,
                    fit.r_squared
                ),
                None => log::warn!(
                    "{} ({}): only {} point(s), no fit",
                    cfg.name,
                    segment.side.symbol(),
                    segment.points.len()
                ),
            }
        }

        series.push(MeasuredSeries {
            name: cfg.name.clone(),
            gear_ratio: cfg.gear_ratio,
            color: cfg.color,
            torque,
            deflection,
            segments,
        });
    }

    Ok(StiffnessRun { series })
}

/// Every row that lands on a torque side must be finite in both columns.
///
/// Rows with zero or missing torque belong to neither side and are not checked.
fn check_fit_rows(table: &Table, torque: &[f64], deflection: &[f64]) -> Result<(), TableError> {
    for (i, (&t, &d)) in torque.iter().zip(deflection).enumerate() {
        if t.is_nan() || t == 0.0 {
            continue;
        }
        let column = if !t.is_finite() {
            OUTPUT_TORQUE_COLUMN
        } else if !d.is_finite() {
            ENCODER_POS_COLUMN
        } else {
            continue;
        };
        return Err(TableError::NonFinite {
            source_name: table.source_name().to_string(),
            column: column.to_string(),
            row: i + 1,
        });
    }
    Ok(())
}

/// The rows of one source for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String,
    /// `(x_metric, metric)` pairs in row order. May contain NaN for missing cells.
    pub points: Vec<(f64, f64)>,
}

/// One output metric split by source label.
#[derive(Debug, Clone)]
pub struct MetricGroups {
    pub metric: String,
    /// Sorted by label.
    pub groups: Vec<Group>,
}

/// All computed outputs of a comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub combined: Table,
    pub metrics: Vec<MetricGroups>,
}

/// Load every configured design sweep and group its metrics.
pub fn run_comparison(config: &ComparisonConfig) -> Result<ComparisonRun, AppError> {
    let sources = config
        .sources
        .iter()
        .map(|s| Ok((s.label.clone(), Table::from_path(&s.path)?)))
        .collect::<Result<Vec<_>, TableError>>()?;

    Ok(comparison_from_tables(config, &sources)?)
}

/// Aggregate already-loaded `(label, table)` pairs.
pub fn comparison_from_tables(
    config: &ComparisonConfig,
    sources: &[(String, Table)],
) -> Result<ComparisonRun, TableError> {
    let combined = Table::concat_tagged(sources, &config.tag_column);
    log::info!(
        "combined {} sources into {} rows",
        sources.len(),
        combined.len()
    );

    let metrics = config
        .y_metrics
        .iter()
        .map(|metric| {
            Ok(MetricGroups {
                metric: metric.clone(),
                groups: group_by_label(&combined, &config.x_metric, metric, &config.tag_column)?,
            })
        })
        .collect::<Result<Vec<_>, TableError>>()?;

    Ok(ComparisonRun { combined, metrics })
}

/// Split `(x, y)` pairs by the value of `tag_column`, labels sorted.
pub fn group_by_label(table: &Table, x: &str, y: &str, tag_column: &str) -> Result<Vec<Group>, TableError> {
    let xs = table.numeric_column(x)?;
    let ys = table.numeric_column(y)?;
    let labels = table.text_column(tag_column)?;

    let mut groups: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    for ((label, x), y) in labels.into_iter().zip(xs).zip(ys) {
        groups.entry(label).or_default().push((x, y));
    }

    Ok(groups
        .into_iter()
        .map(|(label, points)| Group { label, points })
        .collect())
}

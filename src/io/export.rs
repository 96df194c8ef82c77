//! Result exports.
//!
//! - stiffness fits as JSON, for notebooks and reports
//! - the combined comparison table as CSV, for spreadsheets

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::app::pipeline::StiffnessRun;
use crate::domain::Side;
use crate::error::{AppError, EXIT_INPUT};
use crate::io::Table;

/// Serialized form of a stiffness run.
#[derive(Debug, Serialize)]
pub struct StiffnessExport {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub segments: Vec<SegmentExport>,
}

/// One fitted (or unfittable) segment.
///
/// Non-finite values (undefined R², infinite stiffness) are written as `null`.
#[derive(Debug, Serialize)]
pub struct SegmentExport {
    pub series: String,
    pub gear_ratio: f64,
    pub side: Side,
    pub n_points: usize,
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub r_squared: Option<f64>,
    pub stiffness_nm_per_rad: Option<f64>,
}

impl StiffnessExport {
    pub fn from_run(run: &StiffnessRun) -> Self {
        let segments = run
            .series
            .iter()
            .flat_map(|series| {
                Side::BOTH.map(|side| {
                    let segment = series.segment(side);
                    let fit = segment.fit.as_ref();
                    SegmentExport {
                        series: series.name.clone(),
                        gear_ratio: series.gear_ratio,
                        side,
                        n_points: segment.points.len(),
                        slope: fit.and_then(|f| finite(f.slope)),
                        intercept: fit.and_then(|f| finite(f.intercept)),
                        r_squared: fit.and_then(|f| finite(f.r_squared)),
                        stiffness_nm_per_rad: fit.and_then(|f| finite(f.stiffness())),
                    }
                })
            })
            .collect();

        StiffnessExport {
            tool: "actuator".to_string(),
            generated_at: Local::now(),
            segments,
        }
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Write the stiffness fits to a JSON file.
pub fn write_stiffness_json(path: &Path, run: &StiffnessRun) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(EXIT_INPUT, format!("Failed to create export JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, &StiffnessExport::from_run(run))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON: {e}")))?;

    log::info!("wrote stiffness fits to '{}'", path.display());
    Ok(())
}

/// Write a table (header + rows) to a CSV file.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(EXIT_INPUT, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    write_table(csv::Writer::from_writer(file), table)?;

    log::info!("wrote {} rows to '{}'", table.len(), path.display());
    Ok(())
}

fn write_table<W: std::io::Write>(mut writer: csv::Writer<W>, table: &Table) -> Result<(), AppError> {
    let csv_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write export CSV: {e}"));

    writer.write_record(table.headers()).map_err(csv_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|f| f.to_csv_string()))
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::stiffness_from_tables;
    use crate::config::StiffnessConfig;

    #[test]
    fn export_nulls_out_missing_and_non_finite_values() {
        let mut config = StiffnessConfig::default();
        config.series.truncate(1);
        let t = Table::from_reader(
            "flat.csv",
            "encoder_pos_rad,output_torque_Nm\n0.5,1\n0.5,2\n".as_bytes(),
        )
        .unwrap();
        let run = stiffness_from_tables(&config, &[t]).unwrap();

        let export = StiffnessExport::from_run(&run);
        assert_eq!(export.segments.len(), 2);

        let pos = &export.segments[0];
        assert_eq!(pos.n_points, 2);
        assert!(pos.slope.is_some());
        assert!(pos.r_squared.is_none());

        let neg = &export.segments[1];
        assert_eq!(neg.side, Side::Negative);
        assert_eq!(neg.n_points, 0);
        assert!(neg.slope.is_none());

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["segments"][1]["side"], "negative");
        assert!(json["segments"][1]["stiffness_nm_per_rad"].is_null());
    }

    #[test]
    fn combined_table_writes_back_as_csv() {
        let a = Table::from_reader("a.csv", "gearRatio,mass\n5,1.5\n".as_bytes()).unwrap();
        let b = Table::from_reader("b.csv", "gearRatio\n7\n".as_bytes()).unwrap();
        let combined = Table::concat_tagged(&[("A".to_string(), a), ("B".to_string(), b)], "Type");

        let mut buf = Vec::new();
        write_table(csv::Writer::from_writer(&mut buf), &combined).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "gearRatio,mass,Type\n5,1.5,A\n7,,B\n");
    }
}

//! Formatted terminal output.
//!
//! We keep formatting code in one place so the fitting code stays clean and
//! output changes are localized.

use crate::app::pipeline::{ComparisonRun, StiffnessRun};
use crate::domain::Side;
use crate::math::LinearFit;

/// Name of one fitted segment, e.g. `SSPG (+)`.
pub fn segment_name(series: &str, side: Side) -> String {
    format!("{series} ({})", side.symbol())
}

/// One summary line for a fitted segment, or an explicit "not enough points".
pub fn format_fit_line(name: &str, fit: Option<&LinearFit>) -> String {
    match fit {
        None => format!("{name}: not enough points"),
        Some(fit) => format!(
            "{name}: slope={:.6} rad/Nm, intercept={:.6}, R²={}, stiffness≈{:.6} Nm/rad",
            fit.slope,
            fit.intercept,
            fmt_r_squared(fit.r_squared),
            fit.stiffness()
        ),
    }
}

/// Four decimals; an undefined value prints as `nan`.
fn fmt_r_squared(r2: f64) -> String {
    if r2.is_nan() {
        "nan".to_string()
    } else {
        format!("{r2:.4}")
    }
}

/// Every segment of every series: positive then negative, series in order.
pub fn format_stiffness_summary(run: &StiffnessRun) -> Vec<String> {
    run.series
        .iter()
        .flat_map(|series| {
            Side::BOTH.map(|side| {
                format_fit_line(&segment_name(&series.name, side), series.segment(side).fit.as_ref())
            })
        })
        .collect()
}

/// Row counts per source label, for the log.
pub fn format_comparison_counts(run: &ComparisonRun) -> String {
    let Some(first) = run.metrics.first() else {
        return format!("{} rows", run.combined.len());
    };
    let parts: Vec<String> = first
        .groups
        .iter()
        .map(|g| format!("{}={}", g.label, g.points.len()))
        .collect();
    format!("{} rows ({})", run.combined.len(), parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::stiffness_from_tables;
    use crate::config::StiffnessConfig;
    use crate::io::Table;

    #[test]
    fn missing_fit_is_reported_explicitly() {
        assert_eq!(format_fit_line("CPG (−)", None), "CPG (−): not enough points");
    }

    #[test]
    fn fit_line_shows_stiffness() {
        let fit = LinearFit {
            slope: 0.002,
            intercept: -0.0001,
            r_squared: 0.99876,
            n: 10,
        };
        assert_eq!(
            format_fit_line("SSPG (+)", Some(&fit)),
            "SSPG (+): slope=0.002000 rad/Nm, intercept=-0.000100, R²=0.9988, stiffness≈500.000000 Nm/rad"
        );
    }

    #[test]
    fn flat_fit_shows_infinite_stiffness_and_undefined_r_squared() {
        let fit = LinearFit {
            slope: 0.0,
            intercept: 1.0,
            r_squared: f64::NAN,
            n: 3,
        };
        let line = format_fit_line("X (+)", Some(&fit));
        assert!(line.contains("R²=nan,"));
        assert!(line.contains("stiffness≈inf Nm/rad"));
    }

    #[test]
    fn summary_has_four_lines_in_order() {
        let config = StiffnessConfig::default();
        let sspg = Table::from_reader(
            "sspg.csv",
            "encoder_pos_rad,output_torque_Nm\n0.072,1\n0.144,2\n".as_bytes(),
        )
        .unwrap();
        let cpg = Table::from_reader("cpg.csv", "encoder_pos_rad,output_torque_Nm\n".as_bytes()).unwrap();
        let run = stiffness_from_tables(&config, &[sspg, cpg]).unwrap();

        let lines = format_stiffness_summary(&run);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("SSPG (+): slope=0.010000 rad/Nm"));
        assert_eq!(lines[1], "SSPG (−): not enough points");
        assert_eq!(lines[2], "CPG (+): not enough points");
        assert_eq!(lines[3], "CPG (−): not enough points");
    }
}

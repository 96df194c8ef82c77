//! Chart data model.
//!
//! Everything a chart needs is computed here, outside the render call:
//! series points, fitted overlays, axis bounds, labels and colors. The TUI
//! widgets only draw what they are given, which keeps this part testable
//! without a terminal.

use crate::app::pipeline::{ComparisonRun, StiffnessRun};
use crate::config::{ComparisonConfig, StiffnessConfig};
use crate::domain::{ChartStyle, Rgb};
use crate::fit::Segment;

/// Samples drawn along each fitted overlay.
pub const OVERLAY_SAMPLES: usize = 100;

/// Opacity of raw measurement lines, so the dashed fits stay visible on top.
pub const RAW_ALPHA: f64 = 0.7;

/// A polyline with a legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub label: String,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

/// A fitted line, sampled over the x-range of the data it was fitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOverlay {
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct StiffnessChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LineData>,
    pub overlays: Vec<FitOverlay>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub style: ChartStyle,
}

/// One subplot of the comparison grid.
#[derive(Debug, Clone)]
pub struct MetricPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LineData>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

#[derive(Debug, Clone)]
pub struct ComparisonChart {
    pub title: String,
    pub panels: Vec<MetricPanel>,
    /// Shared by every panel.
    pub legend: Vec<(String, Rgb)>,
    /// `(rows, cols)`.
    pub grid: (usize, usize),
    pub style: ChartStyle,
}

/// Build the stiffness chart: raw curves plus one dashed overlay per fit.
pub fn stiffness_chart(run: &StiffnessRun, config: &StiffnessConfig) -> StiffnessChart {
    let mut lines = Vec::with_capacity(run.series.len());
    let mut overlays = Vec::new();

    for series in &run.series {
        lines.push(LineData {
            label: series.legend_label(),
            color: series.color,
            points: finite_points(series.torque.iter().copied().zip(series.deflection.iter().copied())),
        });
        overlays.extend(series.segments.iter().filter_map(|s| fit_overlay(s, series.color)));
    }

    let all_points = lines
        .iter()
        .flat_map(|l| l.points.iter())
        .chain(overlays.iter().flat_map(|o| o.points.iter()));
    let (x_bounds, y_bounds) = padded_bounds(all_points);

    StiffnessChart {
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        lines,
        overlays,
        x_bounds,
        y_bounds,
        style: config.style,
    }
}

/// Sample a segment's fitted line across the segment's own x-range.
///
/// Returns `None` when the segment has no fit. The overlay never extends past
/// the smallest or largest x the fit was computed from.
pub fn fit_overlay(segment: &Segment, color: Rgb) -> Option<FitOverlay> {
    let fit = segment.fit?;
    let (lo, hi) = segment.x_extent()?;
    let points = linspace(lo, hi, OVERLAY_SAMPLES)
        .into_iter()
        .map(|x| (x, fit.predict(x)))
        .collect();
    Some(FitOverlay { color, points })
}

/// Build the comparison grid: one panel per metric, one line per source.
pub fn comparison_chart(run: &ComparisonRun, config: &ComparisonConfig) -> ComparisonChart {
    let mut legend: Vec<(String, Rgb)> = Vec::new();
    let mut panels = Vec::with_capacity(run.metrics.len());

    for metric in &run.metrics {
        let lines: Vec<LineData> = metric
            .groups
            .iter()
            .enumerate()
            .map(|(i, group)| LineData {
                label: group.label.clone(),
                color: source_color(config, &group.label, i),
                points: finite_points(group.points.iter().copied()),
            })
            .collect();

        for line in &lines {
            if !legend.iter().any(|(label, _)| label == &line.label) {
                legend.push((line.label.clone(), line.color));
            }
        }

        let (x_bounds, y_bounds) = padded_bounds(lines.iter().flat_map(|l| l.points.iter()));
        let y_label = capitalize(&metric.metric);
        panels.push(MetricPanel {
            title: format!("{y_label} vs {}", config.x_label),
            x_label: config.x_label.clone(),
            y_label,
            lines,
            x_bounds,
            y_bounds,
        });
    }

    ComparisonChart {
        title: config.title.clone(),
        grid: grid_shape(panels.len()),
        panels,
        legend,
        style: config.style,
    }
}

fn source_color(config: &ComparisonConfig, label: &str, index: usize) -> Rgb {
    config
        .sources
        .iter()
        .find(|s| s.label == label)
        .and_then(|s| s.color)
        .unwrap_or_else(|| Rgb::cycle(index))
}

fn finite_points(points: impl Iterator<Item = (f64, f64)>) -> Vec<(f64, f64)> {
    points.filter(|(x, y)| x.is_finite() && y.is_finite()).collect()
}

/// `n` evenly spaced values from `lo` to `hi`, both included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Axis bounds covering every finite point, padded by 5% on each side.
pub fn padded_bounds<'a>(points: impl IntoIterator<Item = &'a (f64, f64)>) -> ([f64; 2], [f64; 2]) {
    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        if x.is_finite() && y.is_finite() {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
    }
    (pad_range(x0, x1), pad_range(y0, y1))
}

fn pad_range(lo: f64, hi: f64) -> [f64; 2] {
    if !(lo.is_finite() && hi.is_finite()) {
        return [0.0, 1.0];
    }
    if hi <= lo {
        let half = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        return [lo - half, lo + half];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

/// First character upper-case, the rest lower-case.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Smallest near-square `(rows, cols)` grid holding `n` panels.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{comparison_from_tables, stiffness_from_tables};
    use crate::domain::Side;
    use crate::fit::fit_segment;
    use crate::io::Table;

    #[test]
    fn overlay_stays_inside_its_side() {
        let x = [-4.0, -1.0, 0.0, 0.5, 2.0, 3.0];
        let y = [-0.4, -0.1, 0.0, 0.05, 0.2, 0.3];

        for side in Side::BOTH {
            let segment = fit_segment(&x, &y, side);
            let (lo, hi) = segment.x_extent().unwrap();
            let overlay = fit_overlay(&segment, Rgb::BLUE).unwrap();

            assert_eq!(overlay.points.len(), OVERLAY_SAMPLES);
            assert_eq!(overlay.points.first().unwrap().0, lo);
            assert_eq!(overlay.points.last().unwrap().0, hi);
            assert!(overlay.points.iter().all(|&(px, _)| side.contains(px)));
        }
    }

    #[test]
    fn no_fit_means_no_overlay() {
        let segment = fit_segment(&[0.0, 1.0], &[0.0, 1.0], Side::Positive);
        assert!(fit_overlay(&segment, Rgb::RED).is_none());
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    fn bounds_pad_and_skip_non_finite() {
        let pts = [(0.0, 10.0), (10.0, 20.0), (f64::NAN, 1e9)];
        let (x, y) = padded_bounds(pts.iter());
        assert_eq!(x, [-0.5, 10.5]);
        assert_eq!(y, [9.5, 20.5]);

        let (x, _) = padded_bounds([(2.0, 1.0)].iter());
        assert!(x[0] < 2.0 && x[1] > 2.0);

        let (x, y) = padded_bounds(std::iter::empty());
        assert_eq!((x, y), ([0.0, 1.0], [0.0, 1.0]));
    }

    #[test]
    fn capitalize_matches_axis_labels() {
        assert_eq!(capitalize("mass"), "Mass");
        assert_eq!(capitalize("Cost"), "Cost");
        assert_eq!(capitalize("Actuator_width"), "Actuator_width");
        assert_eq!(capitalize("gearRatio"), "Gearratio");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn grid_is_two_by_two_for_four_metrics() {
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(3), (2, 2));
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(5), (2, 3));
    }

    #[test]
    fn stiffness_chart_has_one_line_per_file_and_one_overlay_per_fit() {
        let mut config = StiffnessConfig::default();
        config.series.truncate(1);
        let t = Table::from_reader(
            "sspg.csv",
            "encoder_pos_rad,output_torque_Nm\n-0.144,-2\n-0.072,-1\n0,0\n0.072,1\n".as_bytes(),
        )
        .unwrap();
        let run = stiffness_from_tables(&config, &[t]).unwrap();

        let chart = stiffness_chart(&run, &config);
        assert_eq!(chart.lines.len(), 1);
        assert_eq!(chart.lines[0].label, "SSPG (7.2:1)");
        assert_eq!(chart.lines[0].points.len(), 4);
        // Negative side has two points, positive only one.
        assert_eq!(chart.overlays.len(), 1);
        assert!(chart.overlays[0].points.iter().all(|&(x, _)| (-2.0..=-1.0).contains(&x)));
        assert!(chart.x_bounds[0] < -2.0 && chart.x_bounds[1] > 1.0);
    }

    #[test]
    fn comparison_legend_is_shared_and_colored_consistently() {
        let mut config = ComparisonConfig::default();
        config.sources[3].color = Some(Rgb::BLUE);
        let header = "gearRatio,mass,eff,Cost,Actuator_width\n";
        let sources: Vec<(String, Table)> = ["CPG", "DSPG", "SSPG", "WPG"]
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let csv = format!("{header}{},1,0.9,10,60\n{},2,0.8,11,61\n", i + 5, i + 10);
                (label.to_string(), Table::from_reader(*label, csv.as_bytes()).unwrap())
            })
            .collect();
        let run = comparison_from_tables(&config, &sources).unwrap();

        let chart = comparison_chart(&run, &config);
        assert_eq!(chart.grid, (2, 2));
        assert_eq!(chart.panels.len(), 4);
        assert_eq!(chart.panels[1].title, "Eff vs Gear Ratio");
        assert_eq!(chart.panels[3].y_label, "Actuator_width");

        let legend: Vec<_> = chart.legend.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(legend, ["CPG", "DSPG", "SSPG", "WPG"]);
        assert_eq!(chart.legend[0].1, Rgb::cycle(0));
        assert_eq!(chart.legend[3].1, Rgb::BLUE);

        for panel in &chart.panels {
            assert_eq!(panel.lines.len(), 4);
            assert_eq!(panel.lines[2].color, chart.legend[2].1);
        }
    }
}

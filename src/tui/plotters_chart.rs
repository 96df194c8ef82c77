//! Plotters-powered x/y chart widget for Ratatui.
//!
//! Plotters gives us proper axes, tick labels and a legend box without
//! hand-placing text cells. Its output is drawn into the Ratatui buffer via
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::domain::{ChartStyle, Rgb};
use crate::plot::{FitOverlay, LineData};

/// Points per drawn dash of a fitted overlay, and per gap.
const DASH_ON: usize = 6;
const DASH_OFF: usize = 4;

/// A render-only chart description. All series and bounds are computed
/// outside the render call.
pub struct XyPlottersChart<'a> {
    pub lines: &'a [LineData],
    /// Drawn dashed, on top of `lines`.
    pub overlays: &'a [FitOverlay],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub style: ChartStyle,
    /// Opacity of `lines`.
    pub line_alpha: f64,
    /// Mark each observation as well as joining them.
    pub markers: bool,
    /// Draw a legend box for `lines` inside the plot area.
    pub legend: bool,
}

impl<'a> Widget for XyPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let style = self.style;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .max_light_lines(0)
                .bold_line_style(&WHITE.mix(0.3))
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_tick(*v))
                .y_label_formatter(&|v| fmt_tick(*v))
                .label_style(("sans-serif", style.tick_label_size).into_font().color(&WHITE))
                .axis_desc_style(("sans-serif", style.axis_label_size).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let width = style.stroke_width();

            for line in self.lines {
                let color = plotters_color(line.color);
                let line_style = color.mix(self.line_alpha).stroke_width(width);

                chart
                    .draw_series(LineSeries::new(line.points.iter().copied(), line_style))?
                    .label(line.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], line_style));

                if self.markers {
                    // `Circle` radii are mapped incorrectly by the terminal
                    // backend; a colored `Pixel` gives a clean dot.
                    chart.draw_series(line.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                }
            }

            for overlay in self.overlays {
                let dash_style = plotters_color(overlay.color).stroke_width(width);
                chart.draw_series(
                    dashes(&overlay.points, DASH_ON, DASH_OFF)
                        .into_iter()
                        .map(|dash| PathElement::new(dash, dash_style)),
                )?;
            }

            if self.legend && !self.lines.is_empty() {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .label_font(("sans-serif", style.legend_size).into_font().color(&WHITE))
                    .border_style(&WHITE)
                    .background_style(&BLACK)
                    .draw()?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn plotters_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Split a polyline into dashes of `on` segments separated by `off` segments.
fn dashes(points: &[(f64, f64)], on: usize, off: usize) -> Vec<Vec<(f64, f64)>> {
    let period = (on + off).max(1);
    points
        .chunks(period)
        .map(|chunk| chunk[..chunk.len().min(on + 1)].to_vec())
        .filter(|dash| dash.len() >= 2)
        .collect()
}

/// Tick text that works for both Nm-scale torques and mrad-scale deflections.
fn fmt_tick(v: f64) -> String {
    let a = v.abs();
    if a == 0.0 {
        "0".to_string()
    } else if a >= 1000.0 || a < 0.01 {
        format!("{v:.1e}")
    } else if a >= 10.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::linspace;

    #[test]
    fn dashes_alternate_and_stay_on_the_line() {
        let points: Vec<(f64, f64)> = linspace(0.0, 99.0, 100).into_iter().map(|x| (x, 2.0 * x)).collect();
        let dashes = dashes(&points, DASH_ON, DASH_OFF);

        assert_eq!(dashes.len(), 10);
        assert!(dashes.iter().all(|d| d.len() == DASH_ON + 1));
        assert_eq!(dashes[0][0], (0.0, 0.0));
        assert_eq!(dashes[1][0], (10.0, 20.0));
        assert!(dashes.iter().flatten().all(|p| points.contains(p)));
    }

    #[test]
    fn short_polyline_is_a_single_dash() {
        let dashes = dashes(&[(0.0, 0.0), (1.0, 1.0)], DASH_ON, DASH_OFF);
        assert_eq!(dashes, vec![vec![(0.0, 0.0), (1.0, 1.0)]]);
    }

    fn chart<'a>(lines: &'a [LineData], overlays: &'a [FitOverlay]) -> XyPlottersChart<'a> {
        XyPlottersChart {
            lines,
            overlays,
            x_bounds: [-3.0, 3.0],
            y_bounds: [-0.05, 0.05],
            x_label: "Actuator Torque [Nm]",
            y_label: "Deflection [rad]",
            style: ChartStyle::default(),
            line_alpha: 0.7,
            markers: true,
            legend: true,
        }
    }

    #[test]
    fn series_and_overlays_are_drawn_in_their_colors() {
        let lines = vec![LineData {
            label: "SSPG (7.2:1)".to_string(),
            color: Rgb::BLUE,
            points: vec![(-2.0, -0.02), (-1.0, -0.01), (1.0, 0.01), (2.0, 0.02)],
        }];
        let overlays = vec![FitOverlay {
            color: Rgb::RED,
            points: linspace(1.0, 2.0, 20).into_iter().map(|x| (x, 0.01 * x)).collect(),
        }];

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        chart(&lines, &overlays).render(area, &mut buf);

        let has_fg = |c: TuiColor| buf.content().iter().any(|cell| cell.fg == c);
        assert!(has_fg(TuiColor::Rgb(0, 0, 255)));
        assert!(has_fg(TuiColor::Rgb(255, 0, 0)));
    }

    #[test]
    fn tiny_area_shows_a_hint() {
        let area = Rect::new(0, 0, 50, 4);
        let mut buf = Buffer::empty(area);
        chart(&[], &[]).render(area, &mut buf);

        let first_row: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(first_row.starts_with("Chart area too small"));
    }

    #[test]
    fn tick_format_adapts_to_magnitude() {
        assert_eq!(fmt_tick(0.0), "0");
        assert_eq!(fmt_tick(2.5), "2.50");
        assert_eq!(fmt_tick(-40.0), "-40");
        assert_eq!(fmt_tick(0.002), "2.0e-3");
    }
}

//! Ratatui-based chart viewer.
//!
//! `show` takes over the terminal, draws one finished figure and blocks until
//! the user closes it. Nothing is recomputed while the viewer is open; resizes
//! only trigger a redraw.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::domain::Rgb;
use crate::error::{AppError, EXIT_TERMINAL};
use crate::plot::{ComparisonChart, MetricPanel, RAW_ALPHA, StiffnessChart};

mod plotters_chart;

use plotters_chart::XyPlottersChart;

/// A figure ready to be displayed.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    Stiffness(&'a StiffnessChart),
    Comparison(&'a ComparisonChart),
}

/// Display a figure and wait until it is closed.
pub fn show(screen: Screen<'_>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_TERMINAL, format!("Failed to initialize terminal: {e}")))?;

    Viewer { screen }.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_TERMINAL, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_TERMINAL,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Keys that close the viewer. Raw mode swallows SIGINT, so Ctrl-C is
/// handled here too.
fn is_close_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

struct Viewer<'a> {
    screen: Screen<'a>,
}

impl Viewer<'_> {
    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_TERMINAL, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_TERMINAL, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_TERMINAL, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && is_close_key(&key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        match self.screen {
            Screen::Stiffness(chart) => {
                draw_header(frame, chunks[0], &chart.title, &[]);
                draw_stiffness(frame, chunks[1], chart);
            }
            Screen::Comparison(chart) => {
                draw_header(frame, chunks[0], &chart.title, &chart.legend);
                draw_comparison(frame, chunks[1], chart);
            }
        }
        draw_footer(frame, chunks[2]);
    }
}

fn draw_header(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, legend: &[(String, Rgb)]) {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];

    if !legend.is_empty() {
        lines.push(legend_line(legend));
    }

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

/// One swatch + label per entry, in legend order.
fn legend_line(legend: &[(String, Rgb)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(legend.len() * 2);
    for (i, (label, color)) in legend.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            format!("━━ {label}"),
            Style::default().fg(Color::Rgb(color.0, color.1, color.2)),
        ));
    }
    Line::from(spans)
}

fn draw_stiffness(frame: &mut ratatui::Frame<'_>, area: Rect, chart: &StiffnessChart) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if chart.lines.is_empty() {
        let msg = Paragraph::new("No measurements to plot.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    let widget = XyPlottersChart {
        lines: &chart.lines,
        overlays: &chart.overlays,
        x_bounds: chart.x_bounds,
        y_bounds: chart.y_bounds,
        x_label: &chart.x_label,
        y_label: &chart.y_label,
        style: chart.style,
        line_alpha: RAW_ALPHA,
        markers: false,
        legend: true,
    };
    frame.render_widget(widget, inner);
}

fn draw_comparison(frame: &mut ratatui::Frame<'_>, area: Rect, chart: &ComparisonChart) {
    let cells = grid_cells(area, chart.grid);
    for (panel, cell) in chart.panels.iter().zip(cells) {
        draw_panel(frame, cell, panel, chart);
    }
}

fn draw_panel(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &MetricPanel, chart: &ComparisonChart) {
    let block = Block::default().title(panel.title.as_str()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let widget = XyPlottersChart {
        lines: &panel.lines,
        overlays: &[],
        x_bounds: panel.x_bounds,
        y_bounds: panel.y_bounds,
        x_label: &panel.x_label,
        y_label: &panel.y_label,
        style: chart.style,
        line_alpha: 1.0,
        markers: true,
        legend: false,
    };
    frame.render_widget(widget, inner);
}

/// Split `area` into `rows x cols` equal cells, row-major.
fn grid_cells(area: Rect, (rows, cols): (usize, usize)) -> Vec<Rect> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    row_rects
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
                .split(*row)
                .to_vec()
        })
        .collect()
}

fn draw_footer(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let line = Line::from(Span::styled("q/Esc close", Style::default().fg(Color::Gray)));
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_keys() {
        assert!(is_close_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_close_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_close_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_close_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_close_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn grid_cells_are_row_major_and_tile_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let cells = grid_cells(area, (2, 2));

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], Rect::new(0, 0, 50, 20));
        assert_eq!(cells[1], Rect::new(50, 0, 50, 20));
        assert_eq!(cells[2], Rect::new(0, 20, 50, 20));
        assert_eq!(cells[3], Rect::new(50, 20, 50, 20));
    }

    #[test]
    fn legend_line_keeps_order_and_colors() {
        let legend = vec![("CPG".to_string(), Rgb(1, 2, 3)), ("WPG".to_string(), Rgb::RED)];
        let line = legend_line(&legend);

        let labels: Vec<_> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(labels, ["━━ CPG", "   ", "━━ WPG"]);
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(1, 2, 3)));
    }
}

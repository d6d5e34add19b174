//! Ratatui-based terminal UI.
//!
//! The TUI is a small data-entry form: edit `C0` and the (time, concentration)
//! rows, and the first-order fit, chart and statistics refresh on every change.
//! Fit errors are shown in place of the chart; they never end the session.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_fit_on_observations};
use crate::cli::InputArgs;
use crate::data::{SampleSpec, generate_sample};
use crate::domain::{C0Source, Observation};
use crate::error::AppError;
use crate::io::ingest::load_observations;

mod plotters_chart;

use plotters_chart::DecayChart;

const EXPORT_DATA_PATH: &str = "kinetics_data.csv";
const EXPORT_FIT_PATH: &str = "kinetics_fit.json";
const EXPORT_PLOT_PATH: &str = "kinetics_plot.svg";
const EXPORT_GRID_POINTS: usize = 101;

/// Start the TUI.
pub fn run(args: InputArgs) -> Result<(), AppError> {
    let ingest = load_observations(&args.data_source())?;
    let mut app = App::new(ingest.observations, args.c0);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

/// What the edit buffer is currently bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditTarget {
    C0,
    Row(usize),
    NewRow,
}

struct App {
    observations: Vec<Observation>,
    /// `None` means "use the first observation".
    c0: Option<f64>,
    /// 0 is the C0 field; `i + 1` is observation `i`.
    selected: usize,
    editing: Option<EditTarget>,
    input: String,
    sample_seed: u64,
    status: String,
    run: Result<RunOutput, String>,
}

impl App {
    fn new(observations: Vec<Observation>, c0: Option<f64>) -> Self {
        let mut app = Self {
            observations,
            c0,
            selected: 0,
            editing: None,
            input: String::new(),
            sample_seed: 42,
            status: "Ready.".to_string(),
            run: Err("No fit yet.".to_string()),
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected < self.observations.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('a') => {
                self.editing = Some(EditTarget::NewRow);
                self.input.clear();
                self.status = "New row: type `time,concentration`. Enter to add, Esc to cancel.".to_string();
            }
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('s') => self.load_sample(),
            KeyCode::Char('e') => self.export_to(Path::new(".")),
            _ => {}
        }
        false
    }

    fn begin_edit(&mut self) {
        if self.selected == 0 {
            self.editing = Some(EditTarget::C0);
            self.input = self.c0.map(|v| v.to_string()).unwrap_or_default();
            self.status = "Editing C0 (empty = first observation). Enter to apply, Esc to cancel.".to_string();
        } else if let Some(obs) = self.observations.get(self.selected - 1) {
            self.editing = Some(EditTarget::Row(self.selected - 1));
            self.input = format!("{},{}", obs.time, obs.concentration);
            self.status = "Editing row as `time,concentration`. Enter to apply, Esc to cancel.".to_string();
        }
    }

    fn handle_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                if let Some(target) = self.editing.take() {
                    match self.apply_edit(target) {
                        Ok(()) => self.refit(),
                        Err(msg) => {
                            // Keep the buffer so the user can correct it.
                            self.editing = Some(target);
                            self.status = msg;
                        }
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | 'e' | 'E' | '+') {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_edit(&mut self, target: EditTarget) -> Result<(), String> {
        match target {
            EditTarget::C0 => {
                self.c0 = parse_c0_input(&self.input)?;
            }
            EditTarget::Row(idx) => {
                let obs = parse_row_input(&self.input)?;
                if let Some(slot) = self.observations.get_mut(idx) {
                    *slot = obs;
                }
                sort_by_time(&mut self.observations);
                self.select_observation(obs);
            }
            EditTarget::NewRow => {
                let obs = parse_row_input(&self.input)?;
                self.observations.push(obs);
                sort_by_time(&mut self.observations);
                self.select_observation(obs);
            }
        }
        self.input.clear();
        Ok(())
    }

    /// Move the cursor onto `obs` after the rows were re-sorted.
    fn select_observation(&mut self, obs: Observation) {
        if let Some(i) = self.observations.iter().position(|o| *o == obs) {
            self.selected = i + 1;
        }
    }

    fn delete_selected(&mut self) {
        if self.selected == 0 || self.selected > self.observations.len() {
            self.status = "Select an observation row to delete.".to_string();
            return;
        }
        let removed = self.observations.remove(self.selected - 1);
        self.selected = self.selected.min(self.observations.len());
        self.refit();
        self.status = format!("Removed ({}, {}).", removed.time, removed.concentration);
    }

    fn load_sample(&mut self) {
        self.sample_seed = self.sample_seed.wrapping_add(1);
        let spec = SampleSpec {
            seed: self.sample_seed,
            ..SampleSpec::default()
        };
        match generate_sample(&spec) {
            Ok(data) => {
                self.observations = data;
                self.c0 = Some(spec.c0);
                self.selected = 0;
                self.refit();
                self.status = format!("Synthetic sample (k={}, seed={}).", spec.k, spec.seed);
            }
            Err(e) => self.status = format!("Sample failed: {e}"),
        }
    }

    fn export_to(&mut self, dir: &Path) {
        let Ok(run) = &self.run else {
            self.status = "Nothing to export: the current data cannot be fitted.".to_string();
            return;
        };

        let data_path = dir.join(EXPORT_DATA_PATH);
        let fit_path = dir.join(EXPORT_FIT_PATH);
        let plot_path = dir.join(EXPORT_PLOT_PATH);
        let fit_file = crate::io::curve::build_fit_file(&run.fit, &run.ingest.observations, EXPORT_GRID_POINTS);
        let result = crate::io::export::write_results_csv(&data_path, &run.residuals)
            .and_then(|()| crate::io::curve::write_fit_json(&fit_path, &fit_file))
            .and_then(|()| crate::plot::write_fit_svg(&plot_path, &run.residuals, &run.fit));

        self.status = match result {
            Ok(()) => format!("Exported {EXPORT_DATA_PATH}, {EXPORT_FIT_PATH} and {EXPORT_PLOT_PATH}."),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    fn refit(&mut self) {
        let c0 = match self.c0 {
            Some(v) => C0Source::Explicit(v),
            None => C0Source::FirstObservation,
        };
        self.run = run_fit_on_observations(self.observations.clone(), c0).map_err(|e| e.to_string());
        self.status = match &self.run {
            Ok(run) => format!("Fitted {} points.", run.fit.n),
            Err(e) => e.clone(),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("dk", Style::default().fg(Color::Cyan)),
            Span::raw(" - pseudo-first-order degradation kinetics"),
        ]));

        let summary = match &self.run {
            Ok(run) => format!(
                "k={:.5} | half-life={} | R²={:.4} | RMSE={:.4} | MAE={:.4} | n={}",
                run.fit.k,
                crate::report::fmt_half_life(run.fit.half_life),
                run.stats.r_squared,
                run.stats.rmse,
                run.stats.mae,
                run.fit.n,
            ),
            Err(_) => "no fit".to_string(),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::TOP | Borders::BOTTOM));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_data(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Concentration vs time").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let run = match &self.run {
            Ok(run) => run,
            Err(msg) => {
                let p = Paragraph::new(msg.as_str())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default());
                frame.render_widget(p, inner);
                return;
            }
        };

        let series = chart_series(run, self.selected.checked_sub(1));
        let widget = DecayChart {
            curve: &series.curve,
            points: &series.points,
            selected: &series.selected,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "time",
            y_label: "concentration",
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_data(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let c0_label = match self.c0 {
            Some(v) => format!("C0: {v}"),
            None => "C0: (first observation)".to_string(),
        };

        let mut items = Vec::with_capacity(self.observations.len() + 1);
        items.push(ListItem::new(c0_label));
        for o in &self.observations {
            items.push(ListItem::new(format!("{:>8} {:>10}", o.time, o.concentration)));
        }

        let list = List::new(items)
            .block(Block::default().title("Data (time, C)").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new(format!("> {}_", self.input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 1,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(2),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit  a add  x delete  s sample  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Series and bounds for the chart widget.
struct ChartSeries {
    curve: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    selected: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput, selected: Option<usize>) -> ChartSeries {
    let mut t1 = run.ingest.stats.time_max;
    if !t1.is_finite() || t1 <= 0.0 {
        t1 = 1.0;
    }
    let x_bounds = [0.0, t1];

    let points: Vec<(f64, f64)> = run
        .residuals
        .iter()
        .map(|r| (r.observation.time, r.observation.concentration))
        .collect();
    let selected = selected
        .and_then(|i| points.get(i).copied())
        .into_iter()
        .collect();

    let curve = crate::models::sample_curve(run.fit.k, run.fit.c0, 0.0, t1, 200);

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in points.iter().chain(curve.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartSeries {
        curve,
        points,
        selected,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    }
}

/// Parse the C0 edit buffer; empty means "use the first observation".
fn parse_c0_input(input: &str) -> Result<Option<f64>, String> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid C0 '{s}'."))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(format!("C0 must be > 0, got {v}."));
    }
    Ok(Some(v))
}

/// Parse a `time,concentration` edit buffer.
fn parse_row_input(input: &str) -> Result<Observation, String> {
    let (t, c) = input
        .split_once(',')
        .ok_or_else(|| "Expected `time,concentration`.".to_string())?;
    let t = t
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid time '{}'.", t.trim()))?;
    let c = c
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid concentration '{}'.", c.trim()))?;
    if !(t.is_finite() && t >= 0.0) {
        return Err(format!("Time must be >= 0, got {t}."));
    }
    if !(c.is_finite() && c > 0.0) {
        return Err(format!("Concentration must be > 0, got {c}."));
    }
    Ok(Observation::new(t, c))
}

/// Keep rows time-ordered; the sort is stable so duplicate times keep their order.
fn sort_by_time(observations: &mut [Observation]) {
    observations.sort_by(|a, b| a.time.total_cmp(&b.time));
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.1}")
}

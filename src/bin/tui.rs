// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! fancurve-tui: terminal UI client that connects to the fancurve daemon
//! over a Unix domain socket for editing, previewing, and storing curves.

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fan_curve_utility::config;
use fan_curve_utility::curve::{self, ControlPoint, CurveDataPoint, SampleRange};
use fan_curve_utility::protocol::{self, FanSpeedReading, Request, Response, StatusInfo};
use fan_curve_utility::session::CurveSession;
use fan_curve_utility::store::{FanControlMode, NamedCurve};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs},
};
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

const MAX_TEMP: f64 = 120.0;
const MAX_PERCENT: f64 = 100.0;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "fancurve-tui", about = "Fan curve editor TUI client")]
struct Cli {
    /// Path to the daemon socket.
    #[arg(short, long, default_value = config::DEFAULT_SOCKET_PATH)]
    socket: String,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Editor,
    Curves,
    Status,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Editor, Tab::Curves, Tab::Status];

    fn index(self) -> usize {
        match self {
            Tab::Editor => 0,
            Tab::Curves => 1,
            Tab::Status => 2,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Tab::Editor => "Editor",
            Tab::Curves => "Curves",
            Tab::Status => "Status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointField {
    Temperature,
    FanSpeed,
}

/// Overlay for saving the session under a name.
#[derive(Debug, Clone)]
struct NameInput {
    name: String,
    mode: FanControlMode,
}

struct App {
    tab: Tab,
    running: bool,
    status_message: String,
    connection: Option<Connection>,

    // Editor
    session: CurveSession,
    session_label: FanControlMode,
    selected_point: usize,
    editing_field: PointField,
    sample: SampleRange,

    // Curves
    curves: Vec<NamedCurve>,
    curve_list_state: ListState,
    naming: Option<NameInput>,

    // Status
    daemon_status: Option<StatusInfo>,
    fan_speed: Option<FanSpeedReading>,
}

struct Connection {
    stream: UnixStream,
    reader: BufReader<UnixStream>,
}

impl Connection {
    fn connect(path: &str) -> io::Result<Self> {
        let stream = UnixStream::connect(path)?;
        stream.set_read_timeout(Some(Duration::from_secs(2)))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { stream, reader })
    }

    fn send_request(&mut self, req: &Request) -> io::Result<Response> {
        let encoded = protocol::encode(req).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Encode error: {e}"))
        })?;
        self.stream.write_all(encoded.as_bytes())?;
        self.stream.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        protocol::decode(&line).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Decode error: {e}"))
        })
    }
}

impl App {
    fn new(socket_path: &str) -> Self {
        let connection = match Connection::connect(socket_path) {
            Ok(c) => {
                log::info!("Connected to daemon at {socket_path}");
                Some(c)
            }
            Err(e) => {
                log::error!("Could not connect to daemon: {e}");
                None
            }
        };

        let mut app = Self {
            tab: Tab::Editor,
            running: true,
            status_message: String::new(),
            connection,
            session: CurveSession::from_spec(curve::default_spec()),
            session_label: FanControlMode::Percentage,
            selected_point: 0,
            editing_field: PointField::Temperature,
            sample: SampleRange::default(),
            curves: Vec::new(),
            curve_list_state: ListState::default(),
            naming: None,
            daemon_status: None,
            fan_speed: None,
        };

        if app.connection.is_some() {
            app.fetch_active_curve();
            app.refresh_curves();
            app.refresh_status();
        } else {
            app.status_message =
                "Not connected to daemon, editing locally. Is fancurve-daemon running?".to_string();
        }

        app
    }

    /// Send a request, turning transport failures and `error` replies into a
    /// status message.
    fn request(&mut self, req: &Request) -> Option<Response> {
        let conn = self.connection.as_mut()?;
        match conn.send_request(req) {
            Ok(Response::Error { message }) => {
                self.status_message = format!("Error: {message}");
                None
            }
            Ok(resp) => Some(resp),
            Err(e) => {
                self.status_message = format!("Connection error: {e}");
                self.connection = None;
                None
            }
        }
    }

    fn fetch_active_curve(&mut self) {
        if let Some(Response::Config(spec)) = self.request(&Request::GetConfig) {
            self.session = CurveSession::from_spec(spec);
            self.selected_point = 0;
        }
    }

    fn refresh_curves(&mut self) {
        if let Some(Response::Curves { curves }) = self.request(&Request::ListCurves) {
            self.curves = curves;
            let selected = match self.curve_list_state.selected() {
                _ if self.curves.is_empty() => None,
                Some(i) => Some(i.min(self.curves.len() - 1)),
                None => Some(0),
            };
            self.curve_list_state.select(selected);
        }
    }

    fn refresh_status(&mut self) {
        if let Some(Response::Status(status)) = self.request(&Request::GetStatus) {
            self.sample = status.sample;
            self.daemon_status = Some(status);
        }
    }

    fn refresh_fan_speed(&mut self) {
        if let Some(Response::FanSpeed(reading)) = self.request(&Request::GetFanSpeed) {
            self.fan_speed = Some(reading);
        }
    }

    fn apply_session(&mut self) {
        let spec = self.session.to_spec();
        if let Some(Response::CurveData(data)) = self.request(&Request::GenerateCurve(spec)) {
            self.status_message = format!(
                "Applied {} curve, {} samples",
                self.session.mode(),
                data.curve_data.len()
            );
            self.refresh_status();
        }
    }

    fn save_named(&mut self) {
        let Some(input) = self.naming.take() else {
            return;
        };
        let name = input.name.trim().to_string();
        if name.is_empty() {
            self.status_message = "Name cannot be empty".to_string();
            self.naming = Some(input);
            return;
        }

        let curve = NamedCurve::new(slug(&name), name, self.session.to_spec()).with_mode(input.mode);
        if let Some(Response::Ok { message }) = self.request(&Request::UpsertCurve { curve }) {
            self.status_message = message;
            self.session_label = input.mode;
            self.refresh_curves();
        }
    }

    fn load_selected_curve(&mut self) {
        let Some(curve) = self
            .curve_list_state
            .selected()
            .and_then(|i| self.curves.get(i))
            .cloned()
        else {
            return;
        };
        self.session = CurveSession::from_spec(curve.curve);
        self.session_label = curve.mode;
        self.selected_point = 0;
        self.tab = Tab::Editor;
        self.status_message = format!("Loaded '{}' into the editor, [Enter] to apply", curve.name);
    }

    fn delete_selected_curve(&mut self) {
        let Some(id) = self
            .curve_list_state
            .selected()
            .and_then(|i| self.curves.get(i))
            .map(|c| c.id.clone())
        else {
            return;
        };
        if let Some(Response::Ok { message }) = self.request(&Request::DeleteCurve { id }) {
            self.status_message = message;
            self.refresh_curves();
        }
    }

    fn save_config(&mut self) {
        if let Some(Response::Ok { message }) = self.request(&Request::SaveConfig) {
            self.status_message = message;
        }
    }

    fn reload_config(&mut self) {
        if let Some(Response::Ok { message }) = self.request(&Request::ReloadConfig) {
            self.status_message = message;
            self.fetch_active_curve();
            self.refresh_curves();
            self.refresh_status();
        }
    }

    /// Nudge the selected field. Values are kept in a displayable range here;
    /// the curve itself accepts anything finite.
    fn adjust_selected(&mut self, delta: f64) {
        let Some(point) = self.session.points().get(self.selected_point).copied() else {
            return;
        };
        let adjusted = match self.editing_field {
            PointField::Temperature => ControlPoint {
                temperature: (point.temperature + delta).clamp(0.0, MAX_TEMP),
                ..point
            },
            PointField::FanSpeed => {
                let speed = (point.fan_speed + delta).max(0.0);
                ControlPoint {
                    fan_speed: match self.session_label {
                        FanControlMode::Percentage => speed.min(MAX_PERCENT),
                        FanControlMode::Rpm => speed,
                    },
                    ..point
                }
            }
        };
        if let Err(e) = self.session.update_point(self.selected_point, adjusted) {
            self.status_message = format!("Error: {e}");
        }
    }

    fn add_point(&mut self) {
        let hottest = self
            .session
            .points()
            .iter()
            .map(|p| p.temperature)
            .reduce(f64::max);
        let temperature = hottest.map_or(50.0, |t| t + 10.0).min(MAX_TEMP);
        let fan_speed = self.session.evaluate(temperature);
        self.selected_point = self.session.add_point(ControlPoint::new(temperature, fan_speed));
    }

    fn remove_selected_point(&mut self) {
        if self.session.remove_point(self.selected_point).is_ok()
            && self.selected_point >= self.session.len()
        {
            self.selected_point = self.session.len().saturating_sub(1);
        }
    }
}

/// Turn a display name into a store id.
fn slug(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli.socket);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(500);

    while app.running {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_input(app, key.code, key.modifiers);
            }
        } else if app.tab == Tab::Status {
            app.refresh_status();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

fn handle_input(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
    // Global keys
    match key {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('q') if app.naming.is_none() => {
            app.running = false;
            return;
        }
        _ => {}
    }

    if app.naming.is_some() {
        handle_naming_input(app, key);
        return;
    }

    // Tab switching
    match key {
        KeyCode::Char('1') => app.tab = Tab::Editor,
        KeyCode::Char('2') => app.tab = Tab::Curves,
        KeyCode::Char('3') => app.tab = Tab::Status,
        KeyCode::Tab => {
            let idx = (app.tab.index() + 1) % Tab::ALL.len();
            app.tab = Tab::ALL[idx];
        }
        KeyCode::BackTab => {
            let idx = (app.tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len();
            app.tab = Tab::ALL[idx];
        }
        _ => {}
    }

    // Tab-specific keys
    match app.tab {
        Tab::Editor => handle_editor_input(app, key),
        Tab::Curves => handle_curves_input(app, key),
        Tab::Status => handle_status_input(app, key),
    }
}

fn handle_editor_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            app.selected_point = app.selected_point.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.selected_point + 1 < app.session.len() {
                app.selected_point += 1;
            }
        }
        KeyCode::Char(' ') => {
            app.editing_field = match app.editing_field {
                PointField::Temperature => PointField::FanSpeed,
                PointField::FanSpeed => PointField::Temperature,
            };
        }
        KeyCode::Left | KeyCode::Char('h') => app.adjust_selected(-1.0),
        KeyCode::Right | KeyCode::Char('l') => app.adjust_selected(1.0),
        KeyCode::Char('H') => app.adjust_selected(-5.0),
        KeyCode::Char('L') => app.adjust_selected(5.0),
        KeyCode::Char('+') | KeyCode::Char('a') => app.add_point(),
        KeyCode::Char('-') | KeyCode::Char('x') | KeyCode::Delete => app.remove_selected_point(),
        KeyCode::Char('m') => {
            let mode = app.session.toggle_mode();
            app.status_message = format!("Interpolation: {mode}");
        }
        KeyCode::Char('s') => {
            app.naming = Some(NameInput {
                name: String::new(),
                mode: app.session_label,
            });
        }
        KeyCode::Char('u') => {
            app.fetch_active_curve();
            app.status_message = "Reverted to the daemon's active curve".to_string();
        }
        KeyCode::Enter => app.apply_session(),
        _ => {}
    }
}

fn handle_curves_input(app: &mut App, key: KeyCode) {
    let curve_count = app.curves.len();
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            if curve_count > 0 {
                let i = app.curve_list_state.selected().unwrap_or(0);
                let new_i = if i == 0 { curve_count - 1 } else { i - 1 };
                app.curve_list_state.select(Some(new_i));
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if curve_count > 0 {
                let i = app.curve_list_state.selected().unwrap_or(0);
                let new_i = (i + 1) % curve_count;
                app.curve_list_state.select(Some(new_i));
            }
        }
        KeyCode::Enter | KeyCode::Char('e') => app.load_selected_curve(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_curve(),
        KeyCode::Char('r') => {
            app.refresh_curves();
            app.status_message = "Refreshed".to_string();
        }
        _ => {}
    }
}

fn handle_status_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('r') => {
            app.refresh_status();
            app.refresh_fan_speed();
        }
        KeyCode::Char('s') => app.save_config(),
        KeyCode::Char('R') => app.reload_config(),
        _ => {}
    }
}

fn handle_naming_input(app: &mut App, key: KeyCode) {
    let Some(input) = &mut app.naming else {
        return;
    };

    match key {
        KeyCode::Esc => app.naming = None,
        KeyCode::Tab => {
            input.mode = match input.mode {
                FanControlMode::Percentage => FanControlMode::Rpm,
                FanControlMode::Rpm => FanControlMode::Percentage,
            };
        }
        KeyCode::Backspace => {
            input.name.pop();
        }
        KeyCode::Char(ch) => {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == ' ' {
                input.name.push(ch);
            }
        }
        KeyCode::Enter => app.save_named(),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// UI rendering
// ---------------------------------------------------------------------------

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tab bar
            Constraint::Min(0),   // content
            Constraint::Length(4), // status bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);

    match app.tab {
        Tab::Editor => draw_editor(f, app, chunks[1]),
        Tab::Curves => draw_curves(f, app, chunks[1]),
        Tab::Status => draw_status(f, app, chunks[1]),
    }

    draw_status_bar(f, app, chunks[2]);

    if app.naming.is_some() {
        draw_naming_overlay(f, app);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" fancurve "))
        .select(app.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let connected = if app.connection.is_some() {
        Span::styled(" CONNECTED ", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled(" OFFLINE ", Style::default().fg(Color::Red).bold())
    };

    let msg = Span::raw(format!("  {}", app.status_message));

    let help = match app.tab {
        Tab::Editor => {
            " [j/k]point [Space]field [h/l/H/L]adjust [a]dd [x]remove [m]ode [Enter]apply [s]ave as [u]ndo [q]uit "
        }
        Tab::Curves => " [j/k]nav  [Enter]load  [d]elete  [r]efresh  [q]uit ",
        Tab::Status => " [r]efresh  [s]ave config  [R]eload config  [q]uit ",
    };

    let status_line = Line::from(vec![connected, msg]);
    let help_line = Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)));

    let paragraph =
        Paragraph::new(vec![status_line, help_line]).block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let unit = app.session_label.unit();
    let point_rows: Vec<Row> = app
        .session
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let selected = i == app.selected_point;
            let style = if selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            let field_style = |field| {
                if selected && app.editing_field == field {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    style
                }
            };

            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(style),
                Cell::from(format!("{:.0}°C", p.temperature))
                    .style(field_style(PointField::Temperature)),
                Cell::from(format!("{:.0}{unit}", p.fan_speed)).style(field_style(PointField::FanSpeed)),
            ])
        })
        .collect();

    let points_table = Table::new(
        point_rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(40),
            Constraint::Percentage(50),
        ],
    )
    .header(Row::new(vec!["#", "Temp", "Speed"]).style(Style::default().fg(Color::Cyan).bold()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Points ({}) ", app.session.mode())),
    );

    f.render_widget(points_table, chunks[0]);

    let samples = app.session.sample(app.sample);
    let preview = render_curve_graph(&samples, app.session.points(), unit);
    let preview_widget =
        Paragraph::new(preview).block(Block::default().borders(Borders::ALL).title(" Preview "));
    f.render_widget(preview_widget, chunks[1]);
}

/// Plot sampled values as a text grid, marking control points.
fn render_curve_graph(
    samples: &[CurveDataPoint],
    points: &[ControlPoint],
    unit: &str,
) -> Vec<Line<'static>> {
    let graph_height = 12usize;
    let graph_width = 51usize;

    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return vec![Line::from("  Nothing to plot")];
    };
    let (min_x, max_x) = (first.x, last.x);
    let x_range = (max_x - min_x).max(1.0);
    let max_y = samples
        .iter()
        .map(|s| s.y)
        .chain(points.iter().map(|p| p.fan_speed))
        .filter(|y| y.is_finite())
        .fold(MAX_PERCENT, f64::max);

    let row_of = |y: f64| {
        let scaled = ((y.max(0.0) / max_y) * (graph_height - 1) as f64).round() as usize;
        graph_height - 1 - scaled.min(graph_height - 1)
    };
    let col_of = |x: f64| (((x - min_x) / x_range) * (graph_width - 1) as f64).round() as usize;

    let mut grid = vec![vec![' '; graph_width]; graph_height];
    for s in samples.iter().filter(|s| s.y.is_finite()) {
        grid[row_of(s.y)][col_of(s.x).min(graph_width - 1)] = '█';
    }
    for p in points {
        if p.temperature >= min_x && p.temperature <= max_x && p.fan_speed.is_finite() {
            grid[row_of(p.fan_speed)][col_of(p.temperature).min(graph_width - 1)] = '●';
        }
    }

    let mut lines = Vec::new();
    for (i, row) in grid.iter().enumerate() {
        let label = max_y * (graph_height - 1 - i) as f64 / (graph_height - 1) as f64;
        let row_str: String = row.iter().collect();
        lines.push(Line::from(format!("  {label:>5.0} │{row_str}")));
    }

    lines.push(Line::from(format!("        └{}", "─".repeat(graph_width))));
    lines.push(Line::from(format!(
        "         {min_x:.0}°C{:>width$}{max_x:.0}°C",
        "",
        width = graph_width - 8
    )));
    lines.push(Line::from(format!("  Fan speed in{unit}")));

    lines
}

fn draw_curves(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let items: Vec<ListItem> = app
        .curves
        .iter()
        .map(|c| {
            ListItem::new(format!(
                "{} [{}, {}, {} pts]",
                c.name,
                c.curve.interpolation_mode,
                c.mode,
                c.curve.points.len()
            ))
        })
        .collect();

    let curve_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Curves "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(curve_list, chunks[0], &mut app.curve_list_state.clone());

    let preview = match app.curve_list_state.selected().and_then(|i| app.curves.get(i)) {
        Some(c) => {
            let mut lines = vec![Line::from(format!("  {} ({})", c.name, c.id)), Line::from("")];
            lines.extend(render_curve_graph(
                &c.curve.sample(app.sample),
                &c.curve.points,
                c.mode.unit(),
            ));
            lines
        }
        None => vec![Line::from("No saved curves. Press [s] in the editor to save one.")],
    };

    let preview_widget =
        Paragraph::new(preview).block(Block::default().borders(Borders::ALL).title(" Preview "));
    f.render_widget(preview_widget, chunks[1]);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    match &app.daemon_status {
        Some(status) => {
            lines.push(Line::from(format!(
                "Active curve: {} point(s), {}",
                status.point_count, status.interpolation_mode
            )));
            lines.push(Line::from(format!("Named curves: {}", status.curve_count)));
            lines.push(Line::from(format!("Thermal zone: {}", status.thermal_zone)));
            lines.push(Line::from(format!(
                "Preview range: {}..={} step {}",
                status.sample.from, status.sample.to, status.sample.step
            )));
            lines.push(Line::from(""));
            lines.push(reading_line("Last poll", status.last_reading));
        }
        None => lines.push(Line::from("No status from daemon")),
    }
    lines.push(reading_line("On demand", app.fan_speed));

    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Daemon "));
    f.render_widget(widget, area);
}

fn reading_line(label: &str, reading: Option<FanSpeedReading>) -> Line<'static> {
    let Some(r) = reading else {
        return Line::from(format!("{label}: -"));
    };
    let color = if r.temperature >= 80.0 {
        Color::Red
    } else if r.temperature >= 60.0 {
        Color::Yellow
    } else {
        Color::Green
    };
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(format!("{:.1}°C", r.temperature), Style::default().fg(color)),
        Span::raw(format!(" → fan {:.1}", r.fan_speed)),
    ])
}

fn draw_naming_overlay(f: &mut Frame, app: &App) {
    let Some(input) = &app.naming else {
        return;
    };

    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(format!("Name: {}_", input.name)),
        Line::from(format!("Id:   {}", slug(&input.name))),
        Line::from(format!("Unit: {} [Tab to switch]", input.mode)),
        Line::from(""),
        Line::from(Span::styled(
            " [Enter]save  [Esc]cancel ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Save Curve "),
    );
    f.render_widget(widget, area);
}

/// Utility: create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

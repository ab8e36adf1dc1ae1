mod app;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use app::{format_rate, format_timestamp, truncate, AppState, SnapshotStatus, SportCounts};

const DEFAULT_SNAPSHOT_PATH: &str = "tips_snapshot.db";

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let path: PathBuf = std::env::var("SNAPSHOT_PATH")
        .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string())
        .into();

    let mut app = AppState::new(path);

    // Initial load before rendering
    app.refresh().await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut recent_state = TableState::default();

    let result = run_loop(&mut terminal, &mut app, &mut recent_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    recent_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(5);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, recent_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.refresh().await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.recent.len().saturating_sub(1);
                            let next = recent_state.selected().map_or(0, |i| (i + 1).min(max));
                            recent_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = recent_state.selected().map_or(0, |i| i.saturating_sub(1));
                            recent_state.select(Some(prev));
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh().await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, recent_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | chart | tables | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_chart(f, app, chunks[1]);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);
    render_counts_table(f, app, halves[0]);
    render_recent_table(f, app, recent_state, halves[1]);

    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        SnapshotStatus::Loaded => ("● loaded".to_string(), Color::Green),
        SnapshotStatus::Empty => ("○ no snapshot yet".to_string(), Color::Yellow),
        SnapshotStatus::Opening => ("◌ opening".to_string(), Color::Yellow),
        SnapshotStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let (rows, coverage, saved) = match &app.meta {
        Some(m) => (
            format!("{} rows", m.row_count),
            format!(
                "{} .. {}",
                m.first_day.as_deref().unwrap_or("—"),
                m.last_day.as_deref().unwrap_or("—")
            ),
            format!("saved {}", format_timestamp(&m.saved_at)),
        ),
        None => ("0 rows".to_string(), "—".to_string(), "never saved".to_string()),
    };

    let title_spans = vec![
        Span::styled(
            " Tips Snapshot  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(rows, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(coverage, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(saved, Style::default().fg(Color::DarkGray)),
        Span::raw("  │  "),
        Span::styled(
            truncate(&app.path.display().to_string(), 30),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn sport_group(c: &SportCounts) -> BarGroup<'static> {
    let bars = [
        Bar::default()
            .value(c.won.max(0) as u64)
            .label(Line::from("W"))
            .style(Style::default().fg(Color::Green)),
        Bar::default()
            .value(c.lost.max(0) as u64)
            .label(Line::from("L"))
            .style(Style::default().fg(Color::Red)),
        Bar::default()
            .value(c.pending.max(0) as u64)
            .label(Line::from("P"))
            .style(Style::default().fg(Color::Yellow)),
    ];
    BarGroup::default()
        .label(Line::from(c.sport.clone()))
        .bars(&bars)
}

fn render_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " OUTCOMES BY SPORT ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(4)
        .value_style(Style::default().fg(Color::Black).add_modifier(Modifier::BOLD));

    for c in &app.counts {
        chart = chart.data(sport_group(c));
    }

    f.render_widget(chart, area);
}

fn render_counts_table(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["Sport", "Won", "Lost", "Pend", "Win %"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let totals = app.totals();
    let rows: Vec<Row> = app
        .counts
        .iter()
        .chain(std::iter::once(&totals))
        .map(|c| {
            let style = if c.sport == totals.sport {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(c.sport.clone()),
                Cell::from(c.won.to_string()).style(Style::default().fg(Color::Green)),
                Cell::from(c.lost.to_string()).style(Style::default().fg(Color::Red)),
                Cell::from(c.pending.to_string()).style(Style::default().fg(Color::Yellow)),
                Cell::from(format_rate(c.win_rate())),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " SUMMARY ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

fn render_recent_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["Kick-off", "Sport", "League", "Match", "Tip", "Odds", "Score"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .recent
        .iter()
        .map(|r| {
            let score_color = match r.status.as_str() {
                "Won" => Color::Green,
                "Lost" => Color::Red,
                _ => Color::DarkGray,
            };
            Row::new(vec![
                Cell::from(format_timestamp(&r.timestamp)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(r.sport.clone()),
                Cell::from(truncate(&r.league, 18)),
                Cell::from(truncate(&r.event, 28)),
                Cell::from(truncate(&r.tip, 12)),
                Cell::from(r.odds.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(r.outcome_score.clone()).style(Style::default().fg(score_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Min(10),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " RECENT TIPS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("reload  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll tips  "),
        Span::styled(
            format!("auto-reload: 5s (last {}s ago)", app.last_refresh.elapsed().as_secs()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

//! UI rendering for the TUI.

use focusdeck_core::stats::StatsSummary;
use focusdeck_core::SessionType;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, ViewMode};

/// Accent for the work countdown
const WORK_COLOR: Color = Color::Rgb(220, 80, 80);
/// Accent for break countdowns
const BREAK_COLOR: Color = Color::Rgb(80, 180, 120);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);
/// Label color for stats attributes
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    match app.view_mode {
        ViewMode::Timer => render_timer_view(frame, app),
        ViewMode::Stats => render_stats_view(frame, app),
    }

    if app.picker_open {
        render_subject_picker(frame, app);
    }
    if app.subject_input.is_some() {
        render_subject_input(frame, app);
    }
}

fn session_color(session_type: SessionType) -> Color {
    if session_type.is_work() {
        WORK_COLOR
    } else {
        BREAK_COLOR
    }
}

/// Parse a `#RRGGBB` subject color, falling back to white.
///
/// Colors come from storage unvalidated, so the byte slicing below must
/// never see a non-ASCII string.
fn hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// Render the timer view (countdown, progress, subject).
fn render_timer_view(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: type tabs, countdown, progress, subject, status, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Session type tabs
        Constraint::Min(5),    // Countdown
        Constraint::Length(1), // Progress gauge
        Constraint::Length(2), // Subject line
        Constraint::Length(1), // Status
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_type_tabs(frame, app, chunks[0]);
    render_countdown(frame, app, chunks[1]);
    render_progress(frame, app, chunks[2]);
    render_subject_line(frame, app, chunks[3]);
    render_status(frame, app, chunks[4]);
    render_timer_footer(frame, chunks[5]);
}

/// Render the session type tab bar.
fn render_type_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" focusdeck ", Style::default().cyan().bold())];

    for (i, session_type) in [
        SessionType::Work,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ]
    .iter()
    .enumerate()
    {
        let label = format!("  [{}] {}  ", i + 1, session_type.display_name());
        let style = if *session_type == app.engine.session_type() {
            Style::default()
                .fg(session_color(*session_type))
                .bold()
                .underlined()
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(label, style));
    }

    let tabs = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, area);
}

/// Render the big remaining-time display.
fn render_countdown(frame: &mut Frame, app: &App, area: Rect) {
    let color = session_color(app.engine.session_type());
    let state = if app.engine.is_running() {
        "running"
    } else {
        "paused"
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.engine.remaining_display(),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(state, Style::default().fg(DIM))),
    ];

    let countdown = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(app.engine.session_type().display_name()),
    );
    frame.render_widget(countdown, area);
}

/// Render the elapsed-fraction gauge.
fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(session_color(app.engine.session_type())))
        .ratio(app.engine.progress().clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, area);
}

/// Render the selected subject line.
fn render_subject_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.selected_subject() {
        Some(subject) => {
            let mut spans = vec![
                Span::styled("Subject: ", Style::default().fg(DIM)),
                Span::styled(
                    subject.name.clone(),
                    Style::default().fg(hex_color(&subject.color)).bold(),
                ),
            ];
            if let Some(level) = &subject.level {
                spans.push(Span::styled(
                    format!(" ({})", level),
                    Style::default().fg(DIM),
                ));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled("Subject: none", Style::default().fg(DIM))),
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the one-line status message.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = &app.status {
        let paragraph = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

/// Render the timer view footer with keybinds.
fn render_timer_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(
        " space start/pause | r reset | 1/2/3 session type | p subject | a add | s stats | q quit",
    )
    .style(Style::default().fg(DIM));
    frame.render_widget(footer, area);
}

/// Render the add-subject name input as a centered overlay.
fn render_subject_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 20, frame.area());
    let name = app.subject_input.as_deref().unwrap_or("");

    let input = Paragraph::new(format!("{}_", name)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("New subject name")
            .title_bottom(" enter save | esc cancel "),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(input, area);
}

/// Render the subject picker as a centered overlay.
fn render_subject_picker(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(40, 50, frame.area());

    let items: Vec<ListItem> = app
        .subjects
        .iter()
        .map(|subject| {
            let mut spans = vec![Span::styled(
                subject.name.clone(),
                Style::default().fg(hex_color(&subject.color)),
            )];
            if let Some(level) = &subject.level {
                spans.push(Span::styled(
                    format!(" ({})", level),
                    Style::default().fg(DIM),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Pick a subject")
                .title_bottom(" up/down move | enter start | esc cancel "),
        )
        .highlight_style(Style::default().reversed());

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut app.picker_state);
}

/// Render the statistics view.
fn render_stats_view(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(3), // Header with totals
        Constraint::Min(4),    // Breakdowns
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let title = format!("Statistics ({})", app.stats_range);
    let header = Paragraph::new(match &app.stats {
        Some(stats) => Line::from(vec![
            Span::styled("Sessions: ", Style::default().fg(LABEL_COLOR)),
            Span::styled(stats.total_sessions.to_string(), Style::default().bold()),
            Span::raw("   "),
            Span::styled("Minutes: ", Style::default().fg(LABEL_COLOR)),
            Span::styled(stats.total_minutes.to_string(), Style::default().bold()),
        ]),
        None => Line::from(Span::styled("loading...", Style::default().fg(DIM))),
    })
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .title(Span::styled(title, Style::default().cyan().bold())),
    );
    frame.render_widget(header, chunks[0]);

    if let Some(stats) = &app.stats {
        let halves =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
        render_time_breakdown(frame, stats, halves[0]);
        render_subject_breakdown(frame, stats, halves[1]);
    }

    let footer = Paragraph::new(" tab cycle range | s/esc back to timer | q quit")
        .style(Style::default().fg(DIM));
    frame.render_widget(footer, chunks[2]);
}

/// Render the per-period table.
fn render_time_breakdown(frame: &mut Frame, stats: &StatsSummary, area: Rect) {
    let rows: Vec<Row> = stats
        .time_breakdown
        .iter()
        .map(|bucket| {
            Row::new(vec![
                Cell::from(bucket.period.clone()),
                Cell::from(bucket.sessions.to_string()),
                Cell::from(format!("{} min", bucket.minutes)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(8),
        ],
    )
    .header(
        Row::new(vec!["Period", "Sessions", "Minutes"])
            .style(Style::default().fg(LABEL_COLOR).bold()),
    )
    .block(Block::default().borders(Borders::ALL).title("Over time"));
    frame.render_widget(table, area);
}

/// Render the per-subject table.
fn render_subject_breakdown(frame: &mut Frame, stats: &StatsSummary, area: Rect) {
    let rows: Vec<Row> = stats
        .subject_breakdown
        .iter()
        .map(|subject| {
            Row::new(vec![
                Cell::from(Span::styled(
                    subject.name.clone(),
                    Style::default().fg(hex_color(&subject.color)),
                )),
                Cell::from(subject.sessions.to_string()),
                Cell::from(format!("{} min", subject.minutes)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Subject", "Sessions", "Minutes"])
            .style(Style::default().fg(LABEL_COLOR).bold()),
    )
    .block(Block::default().borders(Borders::ALL).title("By subject"));
    frame.render_widget(table, area);
}

/// Compute a centered rect occupying the given percentages of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

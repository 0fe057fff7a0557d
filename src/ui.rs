//! UI rendering helpers for the terminal user interface.
//!
//! `draw` renders the whole frame from `App` and returns the screen areas the
//! runtime needs for mouse handling.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Padding, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::{App, LoadProblem, Notice, Section};
use crate::contact::{Field, FormError, FormStatus};
use crate::i18n::{Text, cooldown_message};
use crate::library::{SyncStatus, format_time};
use crate::listing::{IDLE_GLYPH, Listing, PLAYING_GLYPH};

const ACCENT: Color = Color::Red;

/// Screen regions that react to the mouse, refreshed on every draw.
#[derive(Debug, Default, Clone)]
pub struct Hitboxes {
    pub progress: Option<Rect>,
    pub volume: Option<Rect>,
    /// Each visible track row and the track index it shows.
    pub rows: Vec<(Rect, usize)>,
}

/// First/last visible row and the selected row's offset, keeping the
/// selection centered when the list is taller than `height`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn format_sync(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame` and return the mouse hit areas.
pub fn draw(frame: &mut Frame, app: &App) -> Hitboxes {
    let mut hits = Hitboxes::default();

    if app.splash {
        draw_splash(frame, app);
        return hits;
    }

    let player_height = if app.player.state().has_played_once { 5 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(player_height),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
    match app.section {
        Section::Home => draw_home(frame, app, chunks[2], &mut hits),
        Section::About => draw_about(frame, app, chunks[2]),
    }
    if player_height > 0 {
        draw_player(frame, app, chunks[3], &mut hits);
    }

    let footer = Paragraph::new(app.text(Text::KeyHints))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[4]);

    if let Some(focus) = app.ticket {
        draw_ticket(frame, app, focus);
    }
    hits
}

fn draw_splash(frame: &mut Frame, app: &App) {
    let area = centered_rect_sized(60, 9, frame.area());
    let lines = vec![
        Line::from(app.text(Text::HeroTitle).bold().fg(ACCENT)),
        Line::from(app.text(Text::HeroSubtitle)),
        Line::from(""),
        Line::from(app.text(Text::IntroButton).reversed()),
        Line::from(""),
        Line::from(format!("[{}]", app.lang.code().to_uppercase()).dim()),
    ];
    let splash = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(splash, area);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |key: Text, section: Section| {
        let span = Span::raw(app.text(key));
        if app.section == section {
            span.bold().fg(ACCENT)
        } else {
            span.dim()
        }
    };
    let clock = Utc::now().format("%H:%M:%S UTC").to_string();
    let line = Line::from(vec![
        tab(Text::NavHome, Section::Home),
        Span::raw(" "),
        tab(Text::NavAbout, Section::About),
        Span::raw("  "),
        Span::raw(format!("[{}]", app.lang.code().to_uppercase())),
        Span::raw("  "),
        Span::raw(clock).dim(),
    ]);
    let header = Paragraph::new(line).alignment(Alignment::Right).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.text(Text::HeroTitle)))
            .title_alignment(Alignment::Left),
    );
    frame.render_widget(header, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    if app.loading {
        spans.push(Span::raw(app.text(Text::Loading)).slow_blink());
    } else if let Some(sync) = app.sync {
        let (label, color) = match sync {
            SyncStatus::Online => (Text::StatusOnline, Color::Green),
            SyncStatus::Cached => (Text::StatusCached, Color::Yellow),
            SyncStatus::Offline => (Text::StatusOffline, Color::Red),
        };
        spans.push(Span::styled("● ", Style::default().fg(color)));
        spans.push(Span::raw(app.text(label)));
        spans.push(Span::raw("  "));
        spans.push(Span::raw(app.text(Text::LabelSync)).dim());
        spans.push(Span::raw(" "));
        spans.push(Span::raw(app.synced_at.map_or_else(|| "--".to_string(), format_sync)));
        if app.has_tracks() {
            if let Some(problem) = &app.problem {
                spans.push(Span::raw("  "));
                spans.push(Span::raw(problem_text(app, problem)).fg(Color::Red));
            }
        }
    }
    match &app.notice {
        Some(Notice::Saved(path)) => {
            spans.push(Span::raw(format!("  {} {}", app.text(Text::DownloadSaved), path)));
        }
        Some(Notice::SaveFailed(reason)) => spans.push(
            Span::raw(format!("  {} {}", app.text(Text::DownloadFailed), reason)).fg(Color::Red),
        ),
        None => {}
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn problem_text(app: &App, problem: &LoadProblem) -> String {
    match problem {
        LoadProblem::RateLimited => app.text(Text::RateLimited).to_string(),
        LoadProblem::Failed(reason) => format!("{} ({})", app.text(Text::LoadFailed), reason),
    }
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect, hits: &mut Hitboxes) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    // Search bar
    let input = app.search.input();
    let query = if input.is_empty() && !app.search_mode {
        Span::raw(app.text(Text::SearchPlaceholder)).dim()
    } else if app.search_mode {
        Span::raw(format!("{input}▌"))
    } else {
        Span::raw(input.to_string())
    };
    let search = Paragraph::new(Line::from(vec![
        Span::raw(app.text(Text::SearchPrompt)).fg(ACCENT),
        Span::raw(" "),
        query,
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let table_area = chunks[1];
    if app.loading && !app.has_tracks() {
        let p = Paragraph::new(app.text(Text::Loading))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, table_area);
        return;
    }
    if !app.has_tracks() {
        if let Some(problem) = &app.problem {
            let p = Paragraph::new(problem_text(app, problem))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, table_area);
            return;
        }
    }

    let rows = match app.listing() {
        Listing::Empty(message) => {
            let p = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, table_area);
            return;
        }
        Listing::Rows(rows) => rows,
    };

    // Borders plus header row.
    let body_height = table_area.height.saturating_sub(3) as usize;
    let selected_pos = rows.iter().position(|r| r.index == app.selected).unwrap_or(0);
    let (start, end, selected_in_window) = visible_window(rows.len(), body_height, selected_pos);

    let body_top = table_area.y + 2;
    let table_rows: Vec<Row> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            hits.rows.push((
                Rect::new(table_area.x + 1, body_top + offset as u16, table_area.width.saturating_sub(2), 1),
                row.index,
            ));
            let marker_style = if row.active {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            let title = Line::from(vec![
                Span::raw(row.title.clone()),
                Span::raw("  "),
                Span::raw(row.subtitle.clone()).dim(),
            ]);
            let style = if row.active {
                Style::default().fg(ACCENT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(Span::styled(row.marker.clone(), marker_style)),
                Cell::from(title),
                Cell::from(row.year.clone()),
                Cell::from(row.size.clone()),
                Cell::from(row.action),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from(app.text(Text::ColTrack)),
        Cell::from(app.text(Text::ColYear)),
        Cell::from(app.text(Text::ColSize)),
        Cell::from(app.text(Text::ColAction)),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(4),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if app.display_indices().contains(&app.selected) {
        state.select(Some(selected_in_window));
    }
    frame.render_stateful_widget(table, table_area, &mut state);
}

fn draw_about(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(app.text(Text::AboutTitle).bold().fg(ACCENT)),
        Line::from(""),
        Line::from(app.text(Text::AboutP1)),
        Line::from(""),
        Line::from(app.text(Text::AboutP2)),
        Line::from(""),
        Line::from(app.text(Text::TicketButton).reversed()),
    ];
    let about = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(bordered(""));
    frame.render_widget(about, area);
}

fn draw_player(frame: &mut Frame, app: &App, area: Rect, hits: &mut Hitboxes) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let state = app.player.state();
    let title = match state.current.and_then(|i| app.tracks.get(i)) {
        Some(track) => {
            let glyph = if state.is_playing { PLAYING_GLYPH } else { IDLE_GLYPH };
            let mut spans = vec![
                Span::raw(format!("{glyph} ")).fg(ACCENT),
                Span::raw(track.display_title()).bold(),
            ];
            if let Some(error) = &state.error {
                spans.push(Span::raw(format!("  ! {error}")).fg(Color::Red));
                if app.player.skip_pending() {
                    spans.push(Span::raw(" »").fg(Color::Red));
                }
            }
            Line::from(spans)
        }
        None => Line::from(app.text(Text::PlayerIdle).dim()),
    };
    frame.render_widget(Paragraph::new(title), rows[0]);

    let (fraction, elapsed, total) = app.progress();
    let timing = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(14)])
        .split(rows[1]);
    let bar = if app.scrubber.is_dragging() { Color::LightRed } else { ACCENT };
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(bar))
        .ratio(fraction.clamp(0.0, 1.0))
        .label("");
    frame.render_widget(progress, timing[0]);
    hits.progress = Some(timing[0]);
    let time = Paragraph::new(format!(" {} / {}", format_time(elapsed), format_time(total)))
        .alignment(Alignment::Right);
    frame.render_widget(time, timing[1]);

    let volume_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(5), Constraint::Length(20), Constraint::Min(0)])
        .split(rows[2]);
    frame.render_widget(Paragraph::new(app.text(Text::VolumeLabel)), volume_row[0]);
    let volume = Gauge::default()
        .gauge_style(Style::default().fg(Color::Gray))
        .ratio(f64::from(state.volume).clamp(0.0, 1.0))
        .label(format!("{:.0}%", state.volume * 100.0));
    frame.render_widget(volume, volume_row[1]);
    hits.volume = Some(volume_row[1]);
}

fn form_status_line<'a>(app: &App, status: &'a FormStatus) -> Option<Line<'a>> {
    let line = match status {
        FormStatus::Idle => return None,
        FormStatus::RateLimited { remaining_minutes } => {
            Line::from(cooldown_message(app.lang, *remaining_minutes)).fg(Color::Red)
        }
        FormStatus::Submitting => Line::from(app.text(Text::FormSending)).slow_blink(),
        FormStatus::Success => Line::from(app.text(Text::FormSent)).fg(Color::Green).bold(),
        FormStatus::Error(error) => {
            let text = match error {
                FormError::CaptchaMissing => app.text(Text::FormCaptchaMissing).to_string(),
                FormError::Required => app.text(Text::FormRequired).to_string(),
                FormError::Unavailable => app.text(Text::FormUnavailable).to_string(),
                FormError::Server(message) => format!("{} {}", app.text(Text::FormError), message),
                FormError::Failed => app.text(Text::FormError).to_string(),
            };
            Line::from(text).fg(Color::Red)
        }
    };
    Some(line)
}

fn draw_ticket(frame: &mut Frame, app: &App, focus: Field) {
    let area = centered_rect_sized(64, 16, frame.area());
    frame.render_widget(Clear, area);

    let status = app.contact.status();
    let mut lines: Vec<Line> = Vec::new();
    if *status == FormStatus::Success {
        lines.push(Line::from(""));
        if let Some(line) = form_status_line(app, status) {
            lines.push(line.centered());
        }
    } else {
        let fields = app.contact.fields();
        let mut field = |label: Text, which: Field| {
            let focused = focus == which;
            let label = Span::raw(app.text(label));
            lines.push(Line::from(if focused { label.fg(ACCENT).bold() } else { label }));
            let value = fields.get(which);
            let cursor = if focused { "▌" } else { "" };
            lines.push(Line::from(format!("> {value}{cursor}")));
            lines.push(Line::from(""));
        };
        field(Text::FormAlias, Field::Alias);
        field(Text::FormMessage, Field::Message);
        if app.contact.captcha_enabled() {
            field(Text::FormCaptcha, Field::Captcha);
        }
        lines.push(Line::from(app.text(Text::FormSend).reversed()));
        if let Some(line) = form_status_line(app, status) {
            lines.push(line);
        }
        lines.push(Line::from(app.text(Text::FormHints).dim()));
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(app.text(Text::TicketButton)));
    frame.render_widget(modal, area);
}

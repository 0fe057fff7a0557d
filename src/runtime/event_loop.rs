use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Notice};
use crate::audio::AudioEvent;
use crate::clock::Clock;
use crate::config::{self, ArrowKeys};
use crate::error::{FetchError, SubmitError};
use crate::http::HttpClient;
use crate::library::{LoadOutcome, TrackRepository, save_track};
use crate::ui::{self, Hitboxes};

/// Results posted back by worker threads.
pub enum WorkerMsg {
    Loaded(LoadOutcome),
    Submitted(Result<(), SubmitError>),
    Saved(Result<PathBuf, FetchError>),
}

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    pub repo: Arc<TrackRepository>,
    pub http: Arc<dyn HttpClient>,
    pub media: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
    pub downloads: PathBuf,
    worker_tx: Sender<WorkerMsg>,
    worker_rx: Receiver<WorkerMsg>,
    /// Mouse regions from the last draw.
    hits: Hitboxes,
    /// The first load waits until the splash is dismissed.
    initial_load_sent: bool,
}

impl EventLoopState {
    pub fn new(
        repo: Arc<TrackRepository>,
        http: Arc<dyn HttpClient>,
        media: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        downloads: PathBuf,
    ) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        Self {
            repo,
            http,
            media,
            clock,
            downloads,
            worker_tx,
            worker_rx,
            hits: Hitboxes::default(),
            initial_load_sent: false,
        }
    }

    fn spawn_load(&self, app: &mut App, refresh: bool) {
        if app.loading {
            return;
        }
        app.loading = true;
        let repo = Arc::clone(&self.repo);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let outcome = if refresh { repo.refresh() } else { repo.load() };
            let _ = tx.send(WorkerMsg::Loaded(outcome));
        });
    }

    fn spawn_submit(&self, app: &mut App) {
        let now_ms = self.clock.now_ms();
        let Ok(submission) = app.contact.begin_submit(now_ms) else {
            return;
        };
        let http = Arc::clone(&self.http);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = submission.send(http.as_ref());
            let _ = tx.send(WorkerMsg::Submitted(result));
        });
    }

    fn spawn_save(&self, app: &App) {
        let Some(track) = app.selected_track().cloned() else {
            return;
        };
        let http = Arc::clone(&self.media);
        let dir = self.downloads.clone();
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = save_track(http.as_ref(), &track, &dir);
            let _ = tx.send(WorkerMsg::Saved(result));
        });
    }

    fn drain_workers(&self, app: &mut App) {
        while let Ok(msg) = self.worker_rx.try_recv() {
            match msg {
                WorkerMsg::Loaded(outcome) => app.apply_load(outcome),
                WorkerMsg::Submitted(result) => app.contact.finish(result, self.clock.now_ms()),
                WorkerMsg::Saved(Ok(path)) => {
                    app.notice = Some(Notice::Saved(path.display().to_string()));
                }
                WorkerMsg::Saved(Err(e)) => {
                    tracing::warn!(error = %e, "download failed");
                    app.notice = Some(Notice::SaveFailed(e.to_string()));
                }
            }
        }
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x
        && x < area.x.saturating_add(area.width)
        && y >= area.y
        && y < area.y.saturating_add(area.height)
}

/// What the loop should do after handling an input event.
enum Flow {
    Continue,
    Quit,
}

/// Main terminal event loop: drains worker results and audio events, ticks
/// timers, draws, then handles input. Returns `Ok(())` when quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_events: &Receiver<AudioEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if !app.splash && !state.initial_load_sent {
            state.initial_load_sent = true;
            state.spawn_load(app, false);
        }

        state.drain_workers(app);

        let mut moved = false;
        for ev in audio_events.try_iter() {
            let before = app.player.state().current;
            app.player.handle_event(&app.tracks, ev, Instant::now());
            moved |= app.player.state().current != before;
        }
        if moved {
            app.follow_current();
        }

        app.tick(Instant::now(), state.clock.now_ms());

        let mut hits = Hitboxes::default();
        terminal.draw(|f| hits = ui::draw(f, app))?;
        state.hits = hits;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let flow = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(key, settings, app, state)
            }
            Event::Mouse(mouse) => {
                handle_mouse(mouse, settings, app, state);
                Flow::Continue
            }
            _ => Flow::Continue,
        };
        if let Flow::Quit = flow {
            return Ok(());
        }
    }
}

fn handle_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> Flow {
    if app.splash {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.enter_archive(),
            KeyCode::Char('L') | KeyCode::Char('l') => app.toggle_lang(),
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            _ => {}
        }
        return Flow::Continue;
    }

    if let Some(focus) = app.ticket {
        match key.code {
            KeyCode::Esc => app.close_ticket(),
            KeyCode::Tab => app.next_ticket_field(),
            KeyCode::Enter => state.spawn_submit(app),
            KeyCode::Backspace => {
                if let Some(field) = app.contact.field_mut(focus) {
                    field.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(field) = app.contact.field_mut(focus) {
                    field.push(c);
                }
            }
            _ => {}
        }
        return Flow::Continue;
    }

    if app.search_mode {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter => app.exit_search(),
            KeyCode::Backspace => app.pop_search_char(now),
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) if !c.is_control() => app.push_search_char(c, now),
            _ => {}
        }
        return Flow::Continue;
    }

    let player = &settings.player;
    // Shift swaps the configured meaning of left/right.
    let seek_arrows = (player.arrow_keys == ArrowKeys::Seek)
        != key.modifiers.contains(KeyModifiers::SHIFT);
    let seek_seconds = i64::try_from(player.seek_seconds).unwrap_or(i64::MAX);

    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Left if seek_arrows => app.player.seek_by(-seek_seconds),
        KeyCode::Right if seek_arrows => app.player.seek_by(seek_seconds),
        KeyCode::Left | KeyCode::Char('p') => app.change_track(-1),
        KeyCode::Right | KeyCode::Char('n') => app.change_track(1),
        KeyCode::Up => app.adjust_volume(player.volume_step),
        KeyCode::Down => app.adjust_volume(-player.volume_step),
        KeyCode::Char('j') => app.next(),
        KeyCode::Char('k') => app.prev(),
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Esc => {
            app.scrubber.cancel();
            app.clear_search();
        }
        KeyCode::Tab => app.toggle_section(),
        KeyCode::Char('L') | KeyCode::Char('l') => app.toggle_lang(),
        KeyCode::Char('t') => app.open_ticket(state.clock.now_ms()),
        KeyCode::Char('d') => state.spawn_save(app),
        KeyCode::Char('r') => state.spawn_load(app, false),
        KeyCode::Char('R') => state.spawn_load(app, true),
        _ => {}
    }
    Flow::Continue
}

fn handle_mouse(
    mouse: MouseEvent,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) {
    if app.splash || app.ticket.is_some() {
        return;
    }
    let (x, y) = (mouse.column, mouse.row);
    let step = settings.player.volume_step;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(bar) = state.hits.progress {
                if app.scrubber.begin(x, y, bar) {
                    return;
                }
            }
            if let Some(volume) = state.hits.volume.filter(|v| contains(*v, x, y)) {
                let level = crate::player::level_at(x, volume.x, volume.width);
                app.set_volume(level as f32);
                return;
            }
            let row = state
                .hits
                .rows
                .iter()
                .find(|(area, _)| contains(*area, x, y))
                .map(|(_, index)| *index);
            if let Some(index) = row {
                app.set_selected(index);
                app.play_selected();
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => app.scrubber.drag(x),
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(fraction) = app.scrubber.end() {
                app.player.seek_fraction(fraction);
            }
        }
        MouseEventKind::ScrollUp => app.adjust_volume(step),
        MouseEventKind::ScrollDown => app.adjust_volume(-step),
        _ => {}
    }
}

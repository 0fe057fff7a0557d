use std::env;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::default_data_dir;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    if env::args().skip(1).any(|a| a == "--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    settings::init_logging(&settings.logging)?;
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), source = ?settings.source.kind, "vault starting");

    let startup::Components {
        mut app,
        audio,
        audio_events,
        repo,
        http,
        media,
        clock,
    } = startup::build(&settings)?;

    let downloads = dirs::download_dir().unwrap_or_else(|| default_data_dir().join("downloads"));
    let mut state = event_loop::EventLoopState::new(repo, http, media, clock, downloads);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result =
        event_loop::run(&mut terminal, &settings, &mut app, &audio_events, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    audio.quit_softly(std::time::Duration::from_millis(settings.player.quit_fade_out_ms));
    tracing::info!("vault stopped");

    run_result
}

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::app::App;
use crate::audio::{AudioEvent, AudioPlayer};
use crate::clock::{Clock, SystemClock};
use crate::config::{self, default_data_dir};
use crate::contact::ContactForm;
use crate::error::HttpError;
use crate::http::{HttpClient, ReqwestClient};
use crate::i18n::Lang;
use crate::library::TrackRepository;
use crate::player::PlaybackController;
use crate::storage::{FileStore, Preferences, StoreHandle};

/// Everything the event loop drives besides the terminal.
pub struct Components {
    pub app: App,
    pub audio: AudioPlayer,
    pub audio_events: Receiver<AudioEvent>,
    pub repo: Arc<TrackRepository>,
    /// Listing and form calls.
    pub http: Arc<dyn HttpClient>,
    /// Audio bodies and downloads.
    pub media: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
}

pub fn build(settings: &config::Settings) -> Result<Components, HttpError> {
    let storage_path = settings
        .storage
        .path
        .clone()
        .unwrap_or_else(|| default_data_dir().join("storage.json"));
    let store: StoreHandle = Arc::new(Mutex::new(FileStore::open(storage_path)));
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(Duration::from_secs(
        settings.source.timeout_secs,
    ))?);
    let media: Arc<dyn HttpClient> = Arc::new(ReqwestClient::for_media(Duration::from_secs(
        settings.source.connect_timeout_secs,
    ))?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let repo = Arc::new(TrackRepository::new(
        settings,
        http.clone(),
        store.clone(),
        clock.clone(),
    ));

    let default_lang = Lang::from_code(&settings.ui.default_lang).unwrap_or(Lang::En);
    let prefs = Preferences::new(store.clone(), default_lang);

    let (events_tx, audio_events) = mpsc::channel::<AudioEvent>();
    let audio = AudioPlayer::new(media.clone(), events_tx);
    let player = PlaybackController::new(
        audio.sender(),
        audio.playback_handle(),
        settings.player.clone(),
        prefs.volume(),
    );
    let contact = ContactForm::new(settings.contact.clone(), store);

    let app = App::new(
        prefs,
        player,
        contact,
        Duration::from_millis(settings.search.debounce_ms),
        settings.ui.splash,
        settings.ui.default_subtitle.clone(),
    );

    Ok(Components {
        app,
        audio,
        audio_events,
        repo,
        http,
        media,
        clock,
    })
}

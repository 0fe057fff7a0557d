use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use super::*;
use crate::audio::{AudioCmd, PlaybackHandle, PlaybackInfo};
use crate::config::{ContactSettings, PlayerSettings};
use crate::contact::{ContactForm, Field, FormStatus};
use crate::error::{FetchError, SubmitError};
use crate::i18n::Lang;
use crate::library::{LoadOutcome, SyncStatus, Track};
use crate::listing::Listing;
use crate::player::PlaybackController;
use crate::storage::{MemoryStore, Preferences, StoreHandle, read_key};

fn t(id: u32, title: &str) -> Track {
    Track {
        id,
        title: title.into(),
        artist: "Artist".into(),
        year: None,
        extra_info: None,
        size: "1 MB".into(),
        src: format!("https://example.com/{id}.mp3"),
        upload_date: None,
    }
}

fn outcome(tracks: Vec<Track>) -> LoadOutcome {
    LoadOutcome {
        tracks,
        status: SyncStatus::Online,
        synced_at: Some(1),
        error: None,
    }
}

struct Rig {
    app: App,
    store: StoreHandle,
    rx: Receiver<AudioCmd>,
    info: PlaybackHandle,
}

fn rig_with(contact: ContactSettings, debounce: Duration) -> Rig {
    let store: StoreHandle = Arc::new(Mutex::new(MemoryStore::new()));
    let (tx, rx) = mpsc::channel();
    let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
    let prefs = Preferences::new(store.clone(), Lang::En);
    let player = PlaybackController::new(tx, info.clone(), PlayerSettings::default(), prefs.volume());
    let contact = ContactForm::new(contact, store.clone());
    let app = App::new(prefs, player, contact, debounce, true, "UNKNOWN".into());
    Rig {
        app,
        store,
        rx,
        info,
    }
}

fn rig() -> Rig {
    rig_with(ContactSettings::default(), Duration::ZERO)
}

fn loaded(titles: &[&str]) -> Rig {
    let mut r = rig();
    let tracks = titles
        .iter()
        .enumerate()
        .map(|(i, title)| t(i as u32 + 1, title))
        .collect();
    r.app.apply_load(outcome(tracks));
    r
}

#[test]
fn apply_load_records_status_and_problem() {
    let mut r = rig();
    assert!(r.app.sync.is_none());
    r.app.apply_load(LoadOutcome {
        tracks: vec![t(1, "A")],
        status: SyncStatus::Offline,
        synced_at: Some(42),
        error: Some(FetchError::RateLimited(403)),
    });
    assert_eq!(r.app.sync, Some(SyncStatus::Offline));
    assert_eq!(r.app.synced_at, Some(42));
    assert_eq!(r.app.problem, Some(LoadProblem::RateLimited));

    r.app.apply_load(LoadOutcome {
        tracks: vec![],
        status: SyncStatus::Offline,
        synced_at: None,
        error: Some(FetchError::Status(500)),
    });
    assert!(matches!(r.app.problem, Some(LoadProblem::Failed(_))));
    assert!(!r.app.has_tracks());
}

#[test]
fn reload_with_fewer_tracks_drops_current_and_selection() {
    let mut r = loaded(&["A", "B", "C", "D"]);
    r.app.set_selected(3);
    r.app.play_selected();
    assert_eq!(r.app.player.state().current, Some(3));

    r.app.apply_load(outcome(vec![t(1, "A"), t(2, "B")]));
    assert_eq!(r.app.player.state().current, None);
    assert_eq!(r.app.selected, 0);
    assert!(r.rx.try_iter().any(|c| c == AudioCmd::Stop));
}

#[test]
fn selection_moves_within_filtered_rows_and_wraps() {
    let mut r = loaded(&["Alpha", "Beta", "Gamma", "Delta"]);
    let now = Instant::now();
    for c in "ta".chars() {
        r.app.push_search_char(c, now);
    }
    assert_eq!(r.app.display_indices(), vec![1, 3]);
    assert_eq!(r.app.selected, 1);
    r.app.next();
    assert_eq!(r.app.selected, 3);
    r.app.next();
    assert_eq!(r.app.selected, 1);
    r.app.prev();
    assert_eq!(r.app.selected, 3);

    r.app.clear_search();
    assert_eq!(r.app.display_indices(), vec![0, 1, 2, 3]);
    assert_eq!(r.app.selected, 3);
}

#[test]
fn debounced_search_applies_on_tick() {
    let mut r = rig_with(ContactSettings::default(), Duration::from_millis(300));
    r.app.apply_load(outcome(vec![t(1, "Alpha"), t(2, "Beta")]));
    let now = Instant::now();
    r.app.push_search_char('b', now);
    assert_eq!(r.app.display_indices(), vec![0, 1]);

    r.app.tick(now + Duration::from_millis(300), 0);
    assert_eq!(r.app.display_indices(), vec![1]);
    assert_eq!(r.app.selected, 1);
}

#[test]
fn listing_reflects_active_row() {
    let mut r = loaded(&["Alpha", "Beta"]);
    r.app.set_selected(1);
    r.app.play_selected();
    let generation = r.app.player.state().generation;
    r.info.lock().unwrap().generation = generation;
    r.app.player.handle_event(
        &r.app.tracks,
        crate::audio::AudioEvent::Started { generation },
        Instant::now(),
    );

    let Listing::Rows(rows) = r.app.listing() else {
        panic!("expected rows");
    };
    assert!(rows[1].active);
    assert!(!rows[0].active);

    r.app.search.push('z', Instant::now());
    assert_eq!(
        r.app.listing(),
        Listing::Empty("NO DATA FOUND IN ARCHIVE...".into())
    );
}

#[test]
fn language_toggle_persists() {
    let mut r = rig();
    assert_eq!(r.app.lang, Lang::En);
    r.app.toggle_lang();
    assert_eq!(r.app.lang, Lang::Es);
    assert_eq!(read_key(&r.store, "vault_lang").as_deref(), Some("es"));
    assert_eq!(r.app.text(crate::i18n::Text::NavHome), "[INICIO]");
}

#[test]
fn volume_changes_are_persisted() {
    let mut r = rig();
    r.app.adjust_volume(-0.25);
    assert_eq!(read_key(&r.store, "vault_volume").as_deref(), Some("0.75"));
    r.app.adjust_volume(5.0);
    assert_eq!(r.app.prefs.volume(), 1.0);
}

#[test]
fn change_track_moves_highlight_along() {
    let mut r = loaded(&["A", "B", "C"]);
    r.app.change_track(-1);
    assert_eq!(r.app.player.state().current, Some(2));
    assert_eq!(r.app.selected, 2);
    r.app.change_track(1);
    assert_eq!(r.app.selected, 0);
}

#[test]
fn progress_prefers_scrub_preview() {
    let mut r = loaded(&["A"]);
    {
        let mut info = r.info.lock().unwrap();
        info.position = Duration::from_secs(30);
        info.duration = Some(Duration::from_secs(120));
    }
    assert_eq!(r.app.progress(), (0.25, 30.0, 120.0));

    assert!(r.app.scrubber.begin(60, 0, Rect::new(0, 0, 100, 1)));
    let (fraction, elapsed, total) = r.app.progress();
    assert_eq!(fraction, 0.6);
    assert!((elapsed - 72.0).abs() < 1e-9);
    assert_eq!(total, 120.0);
}

#[test]
fn section_and_splash_toggles() {
    let mut r = rig();
    assert!(r.app.splash);
    r.app.enter_archive();
    assert!(!r.app.splash);
    r.app.toggle_section();
    assert_eq!(r.app.section, Section::About);
    r.app.toggle_section();
    assert_eq!(r.app.section, Section::Home);
}

#[test]
fn ticket_focus_skips_captcha_unless_enabled() {
    let mut r = rig();
    r.app.open_ticket(0);
    assert_eq!(r.app.ticket, Some(Field::Alias));
    r.app.next_ticket_field();
    assert_eq!(r.app.ticket, Some(Field::Message));
    r.app.next_ticket_field();
    assert_eq!(r.app.ticket, Some(Field::Alias));

    let mut r = rig_with(
        ContactSettings {
            captcha: true,
            ..ContactSettings::default()
        },
        Duration::ZERO,
    );
    r.app.open_ticket(0);
    r.app.next_ticket_field();
    r.app.next_ticket_field();
    assert_eq!(r.app.ticket, Some(Field::Captcha));
}

#[test]
fn successful_ticket_closes_modal_after_delay() {
    let mut r = rig_with(
        ContactSettings {
            endpoint: "https://forms.example.com/x".into(),
            ..ContactSettings::default()
        },
        Duration::ZERO,
    );
    r.app.open_ticket(0);
    *r.app.contact.field_mut(Field::Alias).unwrap() = "a".into();
    *r.app.contact.field_mut(Field::Message).unwrap() = "b".into();
    r.app.contact.begin_submit(0).unwrap();
    r.app.contact.finish(Ok(()), 1_000);
    assert_eq!(r.app.contact.status(), &FormStatus::Success);

    let now = Instant::now();
    r.app.tick(now, 2_000);
    assert!(r.app.ticket.is_some());
    r.app.tick(now, 4_000);
    assert!(r.app.ticket.is_none());
}

#[test]
fn failed_ticket_keeps_modal_open() {
    let mut r = rig_with(
        ContactSettings {
            endpoint: "https://forms.example.com/x".into(),
            ..ContactSettings::default()
        },
        Duration::ZERO,
    );
    r.app.open_ticket(0);
    *r.app.contact.field_mut(Field::Alias).unwrap() = "a".into();
    *r.app.contact.field_mut(Field::Message).unwrap() = "b".into();
    r.app.contact.begin_submit(0).unwrap();
    r.app.contact.finish(
        Err(SubmitError::Rejected {
            status: 500,
            message: None,
        }),
        1_000,
    );
    r.app.tick(Instant::now(), 60_000);
    assert!(r.app.ticket.is_some());
}

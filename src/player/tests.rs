use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use super::scrub::{fraction_at, level_at};
use super::*;
use crate::audio::{AudioCmd, AudioEvent, FailReason, PlaybackHandle, PlaybackInfo};
use crate::config::{EndBehavior, PlayerSettings};
use crate::library::Track;

fn tracks(n: u32) -> Vec<Track> {
    (1..=n)
        .map(|id| Track {
            id,
            title: format!("Song {id}"),
            artist: "Artist".to_string(),
            year: None,
            extra_info: None,
            size: "1 MB".to_string(),
            src: format!("https://example.com/{id}.mp3"),
            upload_date: None,
        })
        .collect()
}

struct Rig {
    ctl: PlaybackController,
    rx: Receiver<AudioCmd>,
    info: PlaybackHandle,
}

impl Rig {
    fn with(settings: PlayerSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
        let ctl = PlaybackController::new(tx, info.clone(), settings, 0.5);
        Self { ctl, rx, info }
    }

    fn new() -> Self {
        Self::with(PlayerSettings::default())
    }

    fn sent(&self) -> Vec<AudioCmd> {
        self.rx.try_iter().collect()
    }

    fn loaded_srcs(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|c| match c {
                AudioCmd::Load { src, .. } => Some(src),
                _ => None,
            })
            .collect()
    }

    /// Pretend the audio thread started the current load.
    fn start(&mut self, tracks: &[Track]) {
        let generation = self.ctl.state().generation;
        if let Ok(mut info) = self.info.lock() {
            info.generation = generation;
            info.playing = true;
            info.duration = Some(Duration::from_secs(200));
            info.position = Duration::from_secs(50);
        }
        self.ctl
            .handle_event(tracks, AudioEvent::Started { generation }, Instant::now());
    }
}

#[test]
fn load_track_wraps_both_ends() {
    let list = tracks(3);
    let mut rig = Rig::new();
    assert_eq!(rig.ctl.load_track(&list, -1), Some(2));
    assert_eq!(rig.ctl.load_track(&list, 3), Some(0));
    assert_eq!(rig.ctl.load_track(&list, 1), Some(1));
    assert_eq!(
        rig.loaded_srcs(),
        [
            "https://example.com/3.mp3",
            "https://example.com/1.mp3",
            "https://example.com/2.mp3"
        ]
    );
}

#[test]
fn load_track_on_empty_list_does_nothing() {
    let mut rig = Rig::new();
    assert_eq!(rig.ctl.load_track(&[], 0), None);
    rig.ctl.toggle_play(&[]);
    assert!(rig.sent().is_empty());
    assert!(!rig.ctl.state().has_played_once);
}

#[test]
fn load_marks_played_once_and_waits_for_audio() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    let state = rig.ctl.state();
    assert!(state.has_played_once);
    assert!(!state.is_playing);
    assert_eq!(state.phase, Phase::Loading);
    assert_eq!(state.generation, 1);
    assert_eq!(
        rig.sent(),
        vec![AudioCmd::Load {
            generation: 1,
            src: "https://example.com/1.mp3".to_string(),
            volume: 0.5,
        }]
    );
}

#[test]
fn change_track_from_nothing_starts_at_first_or_last() {
    let list = tracks(4);
    let mut rig = Rig::new();
    assert_eq!(rig.ctl.change_track(&list, 1), Some(0));

    let mut rig = Rig::new();
    assert_eq!(rig.ctl.change_track(&list, -1), Some(3));
    assert_eq!(rig.ctl.change_track(&list, 1), Some(0));
    assert_eq!(rig.ctl.change_track(&list, -1), Some(3));
}

#[test]
fn toggle_with_nothing_loaded_plays_first_track() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.toggle_play(&list);
    assert_eq!(rig.ctl.state().current, Some(0));
    assert_eq!(rig.loaded_srcs(), ["https://example.com/1.mp3"]);
}

#[test]
fn toggle_follows_the_audio_threads_actual_state() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.start(&list);
    rig.sent();

    rig.ctl.toggle_play(&list);
    assert_eq!(rig.sent(), vec![AudioCmd::Pause]);

    // The sink stopped on its own; the flag says paused even though no Paused event came.
    rig.info.lock().unwrap().playing = false;
    rig.ctl.toggle_play(&list);
    assert_eq!(rig.sent(), vec![AudioCmd::Resume]);
}

#[test]
fn play_or_toggle_loads_other_rows_and_toggles_the_active_one() {
    let list = tracks(3);
    let mut rig = Rig::new();
    rig.ctl.play_or_toggle(&list, 2);
    rig.start(&list);
    assert_eq!(rig.loaded_srcs(), ["https://example.com/3.mp3"]);

    rig.ctl.play_or_toggle(&list, 2);
    assert_eq!(rig.sent(), vec![AudioCmd::Pause]);

    rig.ctl.play_or_toggle(&list, 0);
    assert_eq!(rig.loaded_srcs(), ["https://example.com/1.mp3"]);
}

#[test]
fn stale_events_never_change_state() {
    let list = tracks(3);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.ctl.load_track(&list, 1);
    let now = Instant::now();

    rig.ctl
        .handle_event(&list, AudioEvent::Started { generation: 1 }, now);
    assert!(!rig.ctl.state().is_playing);
    assert_eq!(rig.ctl.state().phase, Phase::Loading);

    rig.ctl.handle_event(
        &list,
        AudioEvent::Failed {
            generation: 1,
            reason: FailReason::Other("boom".to_string()),
        },
        now,
    );
    assert!(rig.ctl.state().error.is_none());
    assert!(!rig.ctl.skip_pending());

    rig.ctl
        .handle_event(&list, AudioEvent::Started { generation: 2 }, now);
    assert!(rig.ctl.state().is_playing);
    assert_eq!(rig.ctl.state().current, Some(1));
}

#[test]
fn superseded_abort_is_not_an_error() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.ctl.handle_event(
        &list,
        AudioEvent::Failed {
            generation: 1,
            reason: FailReason::Aborted,
        },
        Instant::now(),
    );
    let state = rig.ctl.state();
    assert!(state.error.is_none());
    assert_eq!(state.phase, Phase::Loading);
    assert!(!rig.ctl.skip_pending());
}

#[test]
fn failure_is_not_shown_as_playing_and_skips_after_delay() {
    let list = tracks(3);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.sent();
    let now = Instant::now();
    rig.ctl.handle_event(
        &list,
        AudioEvent::Failed {
            generation: 1,
            reason: FailReason::Other("decode error".to_string()),
        },
        now,
    );
    let state = rig.ctl.state();
    assert!(!state.is_playing);
    assert_eq!(state.phase, Phase::Stopped);
    assert_eq!(state.error.as_deref(), Some("decode error"));
    assert!(rig.ctl.skip_pending());

    rig.ctl.tick(&list, now + Duration::from_millis(100));
    assert!(rig.sent().is_empty());

    rig.ctl.tick(&list, now + Duration::from_millis(1500));
    assert_eq!(rig.ctl.state().current, Some(1));
    assert_eq!(rig.loaded_srcs(), ["https://example.com/2.mp3"]);
    assert!(!rig.ctl.skip_pending());
}

/// Fail the current load and let any scheduled skip fire.
fn fail_and_tick(rig: &mut Rig, list: &[Track], now: Instant) {
    let generation = rig.ctl.state().generation;
    rig.ctl.handle_event(
        list,
        AudioEvent::Failed {
            generation,
            reason: FailReason::Other("no audio output device".to_string()),
        },
        now,
    );
    rig.ctl.tick(list, now + Duration::from_secs(10));
}

#[test]
fn skipping_stops_after_every_track_failed_once() {
    let list = tracks(3);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    let now = Instant::now();

    fail_and_tick(&mut rig, &list, now);
    fail_and_tick(&mut rig, &list, now);
    assert_eq!(
        rig.loaded_srcs(),
        [
            "https://example.com/1.mp3",
            "https://example.com/2.mp3",
            "https://example.com/3.mp3"
        ]
    );

    fail_and_tick(&mut rig, &list, now);
    assert!(!rig.ctl.skip_pending());
    assert!(rig.loaded_srcs().is_empty());
    assert_eq!(rig.ctl.state().current, Some(2));
    rig.ctl.tick(&list, now + Duration::from_secs(60));
    assert!(rig.sent().is_empty());
}

#[test]
fn a_successful_start_or_manual_pick_resets_the_failure_count() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    let now = Instant::now();

    fail_and_tick(&mut rig, &list, now);
    rig.start(&list);
    fail_and_tick(&mut rig, &list, now);
    assert_eq!(rig.ctl.state().current, Some(0));

    // Second failure in a row on a two-track list: the lap is done.
    fail_and_tick(&mut rig, &list, now);
    assert_eq!(rig.ctl.state().current, Some(0));
    assert!(!rig.ctl.skip_pending());

    rig.ctl.load_track(&list, 1);
    fail_and_tick(&mut rig, &list, now);
    assert_eq!(rig.ctl.state().current, Some(0));
}

#[test]
fn failure_without_skip_stays_put() {
    let list = tracks(3);
    let mut rig = Rig::with(PlayerSettings {
        skip_on_error: false,
        ..PlayerSettings::default()
    });
    rig.ctl.load_track(&list, 0);
    rig.ctl.handle_event(
        &list,
        AudioEvent::Failed {
            generation: 1,
            reason: FailReason::Other("x".to_string()),
        },
        Instant::now(),
    );
    assert!(!rig.ctl.skip_pending());

    // Toggling a failed track retries it.
    rig.sent();
    rig.ctl.toggle_play(&list);
    assert_eq!(rig.loaded_srcs(), ["https://example.com/1.mp3"]);
}

#[test]
fn ended_track_advances_or_stops() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 1);
    rig.start(&list);
    rig.sent();
    rig.ctl
        .handle_event(&list, AudioEvent::Ended { generation: 1 }, Instant::now());
    assert_eq!(rig.ctl.state().current, Some(0));
    assert_eq!(rig.loaded_srcs(), ["https://example.com/1.mp3"]);

    let mut rig = Rig::with(PlayerSettings {
        on_end: EndBehavior::Stop,
        ..PlayerSettings::default()
    });
    rig.ctl.load_track(&list, 0);
    rig.start(&list);
    rig.sent();
    rig.ctl
        .handle_event(&list, AudioEvent::Ended { generation: 1 }, Instant::now());
    assert_eq!(rig.ctl.state().phase, Phase::Stopped);
    assert!(!rig.ctl.state().is_playing);
    assert!(rig.sent().is_empty());
}

#[test]
fn paused_event_clears_playing() {
    let list = tracks(1);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.start(&list);
    rig.ctl
        .handle_event(&list, AudioEvent::Paused { generation: 1 }, Instant::now());
    assert!(!rig.ctl.state().is_playing);
    assert_eq!(rig.ctl.state().phase, Phase::Loaded);
}

#[test]
fn seeking_maps_fraction_and_offsets() {
    let list = tracks(1);
    let mut rig = Rig::new();
    rig.ctl.seek_fraction(0.5);
    assert!(rig.sent().is_empty(), "nothing loaded, nothing to seek");

    rig.ctl.load_track(&list, 0);
    rig.start(&list);
    rig.sent();

    rig.ctl.seek_fraction(0.25);
    rig.ctl.seek_fraction(7.0);
    rig.ctl.seek_by(-5);
    rig.ctl.seek_by(-500);
    assert_eq!(
        rig.sent(),
        vec![
            AudioCmd::Seek(Duration::from_secs(50)),
            AudioCmd::Seek(Duration::from_secs(200)),
            AudioCmd::Seek(Duration::from_secs(45)),
            AudioCmd::Seek(Duration::ZERO),
        ]
    );
}

#[test]
fn volume_is_clamped_and_forwarded() {
    let mut rig = Rig::new();
    assert_eq!(rig.ctl.adjust_volume(0.75), 1.0);
    assert_eq!(rig.ctl.adjust_volume(-2.0), 0.0);
    assert_eq!(rig.ctl.set_volume(f32::NAN), 0.0);
    assert_eq!(
        rig.sent(),
        vec![
            AudioCmd::SetVolume(1.0),
            AudioCmd::SetVolume(0.0),
            AudioCmd::SetVolume(0.0),
        ]
    );
}

#[test]
fn reload_with_fewer_tracks_clears_current() {
    let list = tracks(5);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 4);
    rig.sent();

    rig.ctl.reconcile_len(5);
    assert_eq!(rig.ctl.state().current, Some(4));

    rig.ctl.reconcile_len(3);
    assert_eq!(rig.ctl.state().current, None);
    assert_eq!(rig.ctl.state().phase, Phase::Empty);
    assert_eq!(rig.sent(), vec![AudioCmd::Stop]);
}

#[test]
fn stop_invalidates_outstanding_events() {
    let list = tracks(2);
    let mut rig = Rig::new();
    rig.ctl.load_track(&list, 0);
    rig.ctl.stop();
    rig.ctl
        .handle_event(&list, AudioEvent::Started { generation: 1 }, Instant::now());
    assert!(!rig.ctl.state().is_playing);
}

#[test]
fn scrub_fraction_is_clamped() {
    assert_eq!(fraction_at(10, 10, 100), 0.0);
    assert_eq!(fraction_at(60, 10, 100), 0.5);
    assert_eq!(fraction_at(5, 10, 100), 0.0);
    assert_eq!(fraction_at(500, 10, 100), 1.0);
    assert_eq!(fraction_at(5, 0, 0), 0.0);
}

#[test]
fn volume_gauge_reaches_both_ends() {
    assert_eq!(level_at(10, 10, 20), 0.0);
    assert_eq!(level_at(29, 10, 20), 1.0);
    assert_eq!(level_at(40, 10, 20), 1.0);
    assert!((level_at(19, 10, 20) - 9.0 / 19.0).abs() < 1e-9);
    assert_eq!(level_at(3, 3, 1), 1.0);
    assert_eq!(level_at(3, 3, 0), 0.0);
}

#[test]
fn scrubber_previews_until_release() {
    let bar = Rect::new(10, 20, 100, 1);
    let mut s = Scrubber::default();
    assert!(!s.begin(5, 20, bar));
    assert!(!s.begin(50, 21, bar));
    assert_eq!(s.end(), None);

    assert!(s.begin(35, 20, bar));
    assert!(s.is_dragging());
    assert_eq!(s.preview(), Some(0.25));
    s.drag(200);
    assert_eq!(s.preview(), Some(1.0));
    s.drag(60);
    assert_eq!(s.end(), Some(0.5));
    assert!(!s.is_dragging());
    assert_eq!(s.preview(), None);

    assert!(s.begin(10, 20, bar));
    s.cancel();
    assert_eq!(s.end(), None);
}

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::audio::{AudioCmd, AudioEvent, FailReason, PlaybackHandle, PlaybackInfo};
use crate::config::{EndBehavior, PlayerSettings};
use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has been loaded.
    Empty,
    /// A load was sent and the audio thread has not answered yet.
    Loading,
    /// The current track is in the sink, playing or paused.
    Loaded,
    /// The current track ended, failed or was stopped; toggling reloads it.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub current: Option<usize>,
    pub is_playing: bool,
    pub has_played_once: bool,
    pub volume: f32,
    /// Bumped on every load; events from older loads are ignored.
    pub generation: u64,
    pub phase: Phase,
    /// Reason of the last playback failure, cleared by the next start.
    pub error: Option<String>,
}

pub struct PlaybackController {
    state: PlayerState,
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    settings: PlayerSettings,
    pending_skip: Option<Instant>,
    /// Failed loads since the last successful start.
    failures: usize,
}

impl PlaybackController {
    pub fn new(
        tx: Sender<AudioCmd>,
        playback: PlaybackHandle,
        settings: PlayerSettings,
        volume: f32,
    ) -> Self {
        Self {
            state: PlayerState {
                current: None,
                is_playing: false,
                has_played_once: false,
                volume: volume.clamp(0.0, 1.0),
                generation: 0,
                phase: Phase::Empty,
                error: None,
            },
            tx,
            playback,
            settings,
            pending_skip: None,
            failures: 0,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Latest snapshot published by the audio thread.
    pub fn playback(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            tracing::warn!(cmd = ?e.0, "audio thread is gone");
        }
    }

    /// Load `index`, wrapping around both ends of `tracks`.
    pub fn load_track(&mut self, tracks: &[Track], index: isize) -> Option<usize> {
        self.failures = 0;
        self.load(tracks, index)
    }

    fn load(&mut self, tracks: &[Track], index: isize) -> Option<usize> {
        if tracks.is_empty() {
            return None;
        }
        let len = tracks.len() as isize;
        let index = index.rem_euclid(len) as usize;
        let track = &tracks[index];

        self.state.generation += 1;
        self.state.current = Some(index);
        self.state.is_playing = false;
        self.state.has_played_once = true;
        self.state.phase = Phase::Loading;
        self.state.error = None;
        self.pending_skip = None;

        tracing::info!(
            index,
            generation = self.state.generation,
            title = %track.display_title(),
            "load track"
        );
        self.send(AudioCmd::Load {
            generation: self.state.generation,
            src: track.src.clone(),
            volume: self.state.volume,
        });
        Some(index)
    }

    /// Move `delta` tracks from the current one. With nothing loaded,
    /// forward starts at the first track and backward at the last.
    pub fn change_track(&mut self, tracks: &[Track], delta: isize) -> Option<usize> {
        let target = match self.state.current {
            Some(i) => i as isize + delta,
            None if delta >= 0 => 0,
            None => -1,
        };
        self.load_track(tracks, target)
    }

    pub fn toggle_play(&mut self, tracks: &[Track]) {
        let Some(current) = self.state.current else {
            self.load_track(tracks, 0);
            return;
        };
        match self.state.phase {
            Phase::Empty | Phase::Stopped => {
                self.load_track(tracks, current as isize);
            }
            Phase::Loading => {
                tracing::debug!("toggle ignored while loading");
            }
            Phase::Loaded => {
                let info = self.playback();
                let playing = if info.generation == self.state.generation {
                    info.playing
                } else {
                    self.state.is_playing
                };
                self.send(if playing {
                    AudioCmd::Pause
                } else {
                    AudioCmd::Resume
                });
            }
        }
    }

    /// Toggle when `index` is the current track, otherwise load it.
    pub fn play_or_toggle(&mut self, tracks: &[Track], index: usize) {
        if self.state.current == Some(index) {
            self.toggle_play(tracks);
        } else {
            self.load_track(tracks, index as isize);
        }
    }

    pub fn handle_event(&mut self, tracks: &[Track], event: AudioEvent, now: Instant) {
        if event.generation() != self.state.generation {
            tracing::debug!(?event, current = self.state.generation, "stale audio event");
            return;
        }
        match event {
            AudioEvent::Started { .. } => {
                self.state.phase = Phase::Loaded;
                self.state.is_playing = true;
                self.state.error = None;
                self.failures = 0;
            }
            AudioEvent::Paused { .. } => {
                self.state.is_playing = false;
            }
            AudioEvent::Failed {
                reason: FailReason::Aborted,
                ..
            } => {
                tracing::debug!("load aborted");
            }
            AudioEvent::Failed {
                reason: FailReason::Other(reason),
                ..
            } => {
                tracing::warn!(%reason, current = ?self.state.current, "playback failed");
                self.state.is_playing = false;
                self.state.phase = Phase::Stopped;
                self.state.error = Some(reason);
                self.failures += 1;
                if self.failures >= tracks.len() {
                    tracing::warn!(failures = self.failures, "every track failed; not skipping");
                } else if self.settings.skip_on_error {
                    self.pending_skip =
                        Some(now + Duration::from_millis(self.settings.error_skip_delay_ms));
                }
            }
            AudioEvent::Ended { .. } => {
                self.state.is_playing = false;
                self.state.phase = Phase::Stopped;
                if self.settings.on_end == EndBehavior::Advance {
                    self.change_track(tracks, 1);
                }
            }
        }
    }

    /// Fire a scheduled skip past a failed track once it is due.
    pub fn tick(&mut self, tracks: &[Track], now: Instant) {
        if self.pending_skip.is_some_and(|at| now >= at) {
            self.pending_skip = None;
            tracing::info!(failures = self.failures, "skipping past failed track");
            let next = self.state.current.map_or(0, |i| i as isize + 1);
            self.load(tracks, next);
        }
    }

    pub fn skip_pending(&self) -> bool {
        self.pending_skip.is_some()
    }

    /// Jump to `fraction` of the current track's length.
    pub fn seek_fraction(&self, fraction: f64) {
        if self.state.phase != Phase::Loaded {
            return;
        }
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if let Some(duration) = self.playback().duration {
            self.send(AudioCmd::Seek(duration.mul_f64(fraction)));
        }
    }

    pub fn seek_by(&self, seconds: i64) {
        if self.state.phase != Phase::Loaded {
            return;
        }
        let position = self.playback().position.as_secs_f64();
        let target = (position + seconds as f64).max(0.0);
        self.send(AudioCmd::Seek(Duration::from_secs_f64(target)));
    }

    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.set_volume(self.state.volume + delta)
    }

    /// Set and return the clamped volume.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.state.volume
        };
        self.state.volume = volume;
        self.send(AudioCmd::SetVolume(volume));
        volume
    }

    /// Forget the current track if a reload left it out of range.
    pub fn reconcile_len(&mut self, len: usize) {
        if self.state.current.is_some_and(|i| i >= len) {
            tracing::info!(len, "current track no longer in list");
            self.stop();
            self.state.current = None;
            self.state.phase = Phase::Empty;
        }
    }

    pub fn stop(&mut self) {
        // Outstanding events of the stopped load must not revive it.
        self.state.generation += 1;
        self.state.is_playing = false;
        self.state.phase = Phase::Stopped;
        self.pending_skip = None;
        self.send(AudioCmd::Stop);
    }
}

//! Commands, events and the shared playback snapshot of the audio thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Replace whatever is loaded with `src` (URL or local path).
    /// `generation` tags every event this load produces.
    Load {
        generation: u64,
        src: String,
        volume: f32,
    },
    Pause,
    Resume,
    /// Jump to an absolute position in the current track.
    Seek(Duration),
    SetVolume(f32),
    Stop,
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailReason {
    /// A newer load replaced this one before it started.
    Aborted,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Started { generation: u64 },
    Paused { generation: u64 },
    Failed { generation: u64, reason: FailReason },
    Ended { generation: u64 },
}

impl AudioEvent {
    pub fn generation(&self) -> u64 {
        match self {
            AudioEvent::Started { generation }
            | AudioEvent::Paused { generation }
            | AudioEvent::Failed { generation, .. }
            | AudioEvent::Ended { generation } => *generation,
        }
    }
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Generation of the load this snapshot describes.
    pub generation: u64,
    /// Whether the sink is actually producing sound.
    pub playing: bool,
    pub position: Duration,
    /// Total length when the decoder knows it.
    pub duration: Option<Duration>,
}

impl PlaybackInfo {
    /// Position as a fraction of the duration, `0.0` when unknown.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => (self.position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

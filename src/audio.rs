//! Audio output: one background thread owning the rodio stream and sink.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, AudioEvent, FailReason, PlaybackHandle, PlaybackInfo};

//! Transport logic between the UI and the audio thread.

mod controller;
mod scrub;

pub use controller::{Phase, PlaybackController, PlayerState};
pub use scrub::{Scrubber, level_at};

#[cfg(test)]
mod tests;

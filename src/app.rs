//! Application module: the state graph shared by the UI and the runtime.
//!
//! `App` owns the loaded tracks, search and selection, the playback
//! controller, preferences and the ticket form.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;

//! The archive listing: track records, filename parsing, formatting helpers,
//! listing sources and the cached repository.

mod download;
mod format;
mod model;
mod parse;
mod repository;
mod source;

pub use download::save_track;
pub use format::{format_bytes, format_time};
pub use model::Track;
pub use parse::{ParsedName, is_audio_name, parse_filename};
pub use repository::{LoadOutcome, SyncStatus, TrackRepository};
pub use source::{Asset, fetch_tracks, tracks_from_assets};

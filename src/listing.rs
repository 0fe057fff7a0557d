//! Projection from the track list, search query and playback state to the
//! rows the track table shows.
//!
//! Nothing here mutates the track list; filtering only decides which rows
//! appear, and every row keeps the index of its track in the full list.

use std::time::{Duration, Instant};

use crate::library::Track;

pub const PLAYING_GLYPH: &str = "❚❚";
pub const IDLE_GLYPH: &str = "▶";

/// Text the projection needs but does not own.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    pub no_results: &'a str,
    pub default_subtitle: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Index of the track in the unfiltered list.
    pub index: usize,
    pub active: bool,
    /// Zero-padded id, or the play indicator on the active row.
    pub marker: String,
    pub title: String,
    pub subtitle: String,
    pub year: String,
    pub size: String,
    /// Play/pause glyph for this row's toggle.
    pub action: &'static str,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Empty(String),
    Rows(Vec<Row>),
}

impl Listing {
    pub fn rows(&self) -> &[Row] {
        match self {
            Listing::Empty(_) => &[],
            Listing::Rows(rows) => rows,
        }
    }
}

/// Case-insensitive substring match on title, artist or extra info.
pub fn matches(track: &Track, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    let hit = |s: &str| s.to_lowercase().contains(query_lower);
    hit(&track.title) || hit(&track.artist) || track.extra_info.as_deref().is_some_and(hit)
}

/// Indices of the tracks matching `query`, in list order.
pub fn filter_indices(tracks: &[Track], query: &str) -> Vec<usize> {
    let query_lower = query.trim().to_lowercase();
    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| matches(t, &query_lower))
        .map(|(i, _)| i)
        .collect()
}

pub fn project(
    tracks: &[Track],
    query: &str,
    active: Option<usize>,
    playing: bool,
    labels: Labels<'_>,
) -> Listing {
    let rows: Vec<Row> = filter_indices(tracks, query)
        .into_iter()
        .map(|index| {
            let track = &tracks[index];
            let is_active = active == Some(index);
            let marker = if is_active {
                if playing { IDLE_GLYPH } else { PLAYING_GLYPH }.to_string()
            } else {
                format!("{:02}", track.id)
            };
            Row {
                index,
                active: is_active,
                marker,
                title: track.title.clone(),
                subtitle: track.subtitle(labels.default_subtitle).to_string(),
                year: track.year_label(),
                size: track.size.clone(),
                action: if is_active && playing {
                    PLAYING_GLYPH
                } else {
                    IDLE_GLYPH
                },
                src: track.src.clone(),
            }
        })
        .collect();

    if rows.is_empty() {
        Listing::Empty(labels.no_results.to_string())
    } else {
        Listing::Rows(rows)
    }
}

/// Search text with an optional debounce between typing and filtering.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    input: String,
    applied: String,
    debounce: Duration,
    last_edit: Option<Instant>,
}

impl SearchQuery {
    pub fn new(debounce: Duration) -> Self {
        Self {
            input: String::new(),
            applied: String::new(),
            debounce,
            last_edit: None,
        }
    }

    /// What the user has typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The query the list is currently filtered by.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.edited(now);
    }

    pub fn pop(&mut self, now: Instant) {
        self.input.pop();
        self.edited(now);
    }

    /// Clear both the typed and the applied query immediately.
    pub fn clear(&mut self) {
        self.input.clear();
        self.applied.clear();
        self.last_edit = None;
    }

    fn edited(&mut self, now: Instant) {
        if self.debounce.is_zero() {
            self.applied = self.input.clone();
            self.last_edit = None;
        } else {
            self.last_edit = Some(now);
        }
    }

    /// Apply pending input once the debounce has elapsed. Returns true when
    /// the applied query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(at) if now.saturating_duration_since(at) >= self.debounce => {
                self.last_edit = None;
                if self.applied != self.input {
                    self.applied = self.input.clone();
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Apply pending input right away (e.g. on Enter).
    pub fn flush(&mut self) -> bool {
        self.last_edit = None;
        if self.applied != self.input {
            self.applied = self.input.clone();
            true
        } else {
            false
        }
    }
}

//! Application model types: `App`, `Section` and the load problem shown in the list.

use std::time::{Duration, Instant};

use crate::contact::{ContactForm, Field};
use crate::error::FetchError;
use crate::i18n::{Lang, Text, t};
use crate::library::{LoadOutcome, SyncStatus, Track};
use crate::listing::{self, Labels, Listing, SearchQuery};
use crate::player::{PlaybackController, Scrubber};
use crate::storage::Preferences;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Home,
    About,
}

/// Why the last load came back without fresh data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadProblem {
    RateLimited,
    Failed(String),
}

impl From<&FetchError> for LoadProblem {
    fn from(e: &FetchError) -> Self {
        match e {
            FetchError::RateLimited(_) => Self::RateLimited,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// A one-line message shown under the list until replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Saved(String),
    SaveFailed(String),
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    /// `None` until the first load finishes.
    pub sync: Option<SyncStatus>,
    pub synced_at: Option<i64>,
    pub problem: Option<LoadProblem>,
    pub loading: bool,

    pub search: SearchQuery,
    pub search_mode: bool,
    /// Index into `tracks` of the highlighted row.
    pub selected: usize,

    pub section: Section,
    pub splash: bool,
    pub lang: Lang,
    default_subtitle: String,

    pub prefs: Preferences,
    pub player: PlaybackController,
    pub scrubber: Scrubber,
    pub contact: ContactForm,
    /// Focused field while the ticket modal is open.
    pub ticket: Option<Field>,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(
        prefs: Preferences,
        player: PlaybackController,
        contact: ContactForm,
        search_debounce: Duration,
        splash: bool,
        default_subtitle: String,
    ) -> Self {
        let lang = prefs.lang();
        Self {
            tracks: Vec::new(),
            sync: None,
            synced_at: None,
            problem: None,
            loading: false,
            search: SearchQuery::new(search_debounce),
            search_mode: false,
            selected: 0,
            section: Section::Home,
            splash,
            lang,
            default_subtitle,
            prefs,
            player,
            scrubber: Scrubber::default(),
            contact,
            ticket: None,
            notice: None,
        }
    }

    pub fn text(&self, key: Text) -> &'static str {
        t(self.lang, key)
    }

    /// Replace the track list with a finished load.
    pub fn apply_load(&mut self, outcome: LoadOutcome) {
        self.loading = false;
        self.tracks = outcome.tracks;
        self.sync = Some(outcome.status);
        self.synced_at = outcome.synced_at;
        self.problem = outcome.error.as_ref().map(LoadProblem::from);
        self.player.reconcile_len(self.tracks.len());
        self.ensure_selected_visible();
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Indices shown for the applied search query, in list order.
    pub fn display_indices(&self) -> Vec<usize> {
        listing::filter_indices(&self.tracks, self.search.applied())
    }

    pub fn listing(&self) -> Listing {
        let state = self.player.state();
        let subtitle = if self.default_subtitle.trim().is_empty() {
            self.text(Text::DefaultArtist)
        } else {
            self.default_subtitle.as_str()
        };
        listing::project(
            &self.tracks,
            self.search.applied(),
            state.current,
            state.is_playing,
            Labels {
                no_results: self.text(Text::NoResults),
                default_subtitle: subtitle,
            },
        )
    }

    /// Move the selection into the visible rows when a filter hid it.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        match display.first() {
            None => self.selected = 0,
            Some(&first) if !display.contains(&self.selected) => self.selected = first,
            Some(_) => {}
        }
    }

    /// Move selection to the next visible track, wrapping.
    pub fn next(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible track, wrapping.
    pub fn prev(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(0) | None => display[display.len() - 1],
            Some(p) => display[p - 1],
        };
    }

    pub fn set_selected(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.selected = index;
        }
    }

    // ---- search ----

    pub fn enter_search(&mut self) {
        self.search_mode = true;
    }

    pub fn exit_search(&mut self) {
        self.search_mode = false;
        if self.search.flush() {
            self.ensure_selected_visible();
        }
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search.push(c, now);
        self.ensure_selected_visible();
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        self.search.pop(now);
        self.ensure_selected_visible();
    }

    // ---- playback ----

    /// Play the highlighted row, or toggle it when it is already current.
    pub fn play_selected(&mut self) {
        if self.has_tracks() {
            self.player.play_or_toggle(&self.tracks, self.selected);
        }
    }

    pub fn toggle_play(&mut self) {
        self.player.toggle_play(&self.tracks);
        self.follow_current();
    }

    pub fn change_track(&mut self, delta: isize) {
        self.player.change_track(&self.tracks, delta);
        self.follow_current();
    }

    /// Keep the highlight on the playing track when it is visible.
    pub fn follow_current(&mut self) {
        if let Some(current) = self.player.state().current {
            if self.display_indices().contains(&current) {
                self.selected = current;
            }
        }
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        let volume = self.player.adjust_volume(delta);
        self.prefs.set_volume(volume);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = self.player.set_volume(volume);
        self.prefs.set_volume(volume);
    }

    /// Periodic work: debounce, error-skip and modal auto-close.
    pub fn tick(&mut self, now: Instant, now_ms: i64) {
        if self.search.tick(now) {
            self.ensure_selected_visible();
        }
        let before = self.player.state().current;
        self.player.tick(&self.tracks, now);
        if self.player.state().current != before {
            self.follow_current();
        }
        if self.ticket.is_some() && self.contact.should_auto_close(now_ms) {
            self.close_ticket();
        }
    }

    /// Progress fraction and elapsed/total seconds for the player bar;
    /// the scrub preview wins while dragging.
    pub fn progress(&self) -> (f64, f64, f64) {
        let info = self.player.playback();
        let total = info.duration.map_or(0.0, |d| d.as_secs_f64());
        match self.scrubber.preview() {
            Some(fraction) => (fraction, fraction * total, total),
            None => (info.progress(), info.position.as_secs_f64(), total),
        }
    }

    // ---- shell ----

    pub fn enter_archive(&mut self) {
        self.splash = false;
    }

    pub fn toggle_section(&mut self) {
        self.section = match self.section {
            Section::Home => Section::About,
            Section::About => Section::Home,
        };
    }

    pub fn toggle_lang(&mut self) {
        self.lang = self.lang.toggled();
        self.prefs.set_lang(self.lang);
        tracing::info!(lang = self.lang.code(), "language changed");
    }

    pub fn open_ticket(&mut self, now_ms: i64) {
        self.contact.open(now_ms);
        self.ticket = Some(Field::Alias);
    }

    pub fn close_ticket(&mut self) {
        self.ticket = None;
    }

    /// Cycle focus through the visible form fields.
    pub fn next_ticket_field(&mut self) {
        let captcha = self.contact.captcha_enabled();
        self.ticket = self.ticket.map(|f| match f {
            Field::Alias => Field::Message,
            Field::Message if captcha => Field::Captcha,
            _ => Field::Alias,
        });
    }
}

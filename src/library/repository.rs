use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{ParserSettings, Settings, SourceSettings};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::storage::{KeyValueStore, StoreHandle, read_key, write_key};

use super::model::Track;
use super::source::fetch_tracks;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Milliseconds since the epoch at which `data` was fetched.
    timestamp: i64,
    data: Vec<Track>,
}

/// Where the tracks of a load came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Fetched from the source just now.
    Online,
    /// Served from a cache entry younger than the TTL.
    Cached,
    /// The fetch failed; tracks (if any) come from a stale cache.
    Offline,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub tracks: Vec<Track>,
    pub status: SyncStatus,
    /// When the returned tracks were fetched from the source.
    pub synced_at: Option<i64>,
    pub error: Option<FetchError>,
}

/// Fetches the configured listing and keeps a timestamped copy in storage.
pub struct TrackRepository {
    source: SourceSettings,
    parser: ParserSettings,
    ttl_ms: i64,
    cache_key: String,
    http: Arc<dyn HttpClient>,
    store: StoreHandle,
    clock: Arc<dyn Clock>,
}

impl TrackRepository {
    pub fn new(
        settings: &Settings,
        http: Arc<dyn HttpClient>,
        store: StoreHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source: settings.source.clone(),
            parser: settings.parser.clone(),
            ttl_ms: i64::try_from(settings.cache.ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
            cache_key: settings.cache.key.clone(),
            http,
            store,
            clock,
        }
    }

    /// Cached tracks while fresh, otherwise one fetch.
    pub fn load(&self) -> LoadOutcome {
        self.load_with(false)
    }

    /// Fetch even when the cache is fresh; still falls back to it on failure.
    pub fn refresh(&self) -> LoadOutcome {
        self.load_with(true)
    }

    fn load_with(&self, bypass_cache: bool) -> LoadOutcome {
        let now = self.clock.now_ms();
        let cached = self.read_cache();

        if !bypass_cache {
            if let Some(entry) = cached.as_ref().filter(|e| now - e.timestamp < self.ttl_ms) {
                tracing::info!(
                    tracks = entry.data.len(),
                    age_ms = now - entry.timestamp,
                    "serving track list from cache"
                );
                return LoadOutcome {
                    tracks: entry.data.clone(),
                    status: SyncStatus::Cached,
                    synced_at: Some(entry.timestamp),
                    error: None,
                };
            }
        }

        match fetch_tracks(&self.source, &self.parser, self.http.as_ref()) {
            Ok(tracks) => {
                tracing::info!(tracks = tracks.len(), kind = ?self.source.kind, "fetched track list");
                self.write_cache(now, &tracks);
                LoadOutcome {
                    tracks,
                    status: SyncStatus::Online,
                    synced_at: Some(now),
                    error: None,
                }
            }
            Err(error) => match cached {
                Some(entry) => {
                    tracing::warn!(%error, tracks = entry.data.len(), "fetch failed; using stale cache");
                    LoadOutcome {
                        tracks: entry.data,
                        status: SyncStatus::Offline,
                        synced_at: Some(entry.timestamp),
                        error: Some(error),
                    }
                }
                None => {
                    tracing::error!(%error, "fetch failed and no cache is available");
                    LoadOutcome {
                        tracks: Vec::new(),
                        status: SyncStatus::Offline,
                        synced_at: None,
                        error: Some(error),
                    }
                }
            },
        }
    }

    fn read_cache(&self) -> Option<CacheEntry> {
        let raw = read_key(&self.store, &self.cache_key)?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key = %self.cache_key, error = %e, "discarding unreadable cache entry");
                if let Ok(mut store) = self.store.lock() {
                    let _ = store.remove(&self.cache_key);
                }
                None
            }
        }
    }

    fn write_cache(&self, now: i64, tracks: &[Track]) {
        let entry = CacheEntry {
            timestamp: now,
            data: tracks.to_vec(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => write_key(&self.store, &self.cache_key, &json),
            Err(e) => tracing::warn!(error = %e, "could not encode track cache"),
        }
    }
}

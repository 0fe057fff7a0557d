use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vault/config.toml` or `~/.config/vault/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VAULT__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub cache: CacheSettings,
    pub parser: ParserSettings,
    pub player: PlayerSettings,
    pub search: SearchSettings,
    pub contact: ContactSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A JSON array of ready-made track records (local path or URL).
    #[serde(alias = "database", alias = "local")]
    Manifest,
    /// A local directory of audio files.
    #[serde(alias = "dir", alias = "folder")]
    Directory,
    /// Assets attached to the releases of a GitHub repository.
    #[serde(alias = "github-releases")]
    Releases,
    /// Files in a directory of a GitHub repository.
    #[serde(alias = "github-contents")]
    Contents,
}

/// How a `contents` entry becomes a playable URL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentLink {
    #[serde(alias = "jsdelivr")]
    Cdn,
    #[serde(alias = "github-pages")]
    Pages,
    #[serde(alias = "raw")]
    Direct,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Manifest location for `kind = "manifest"` (path or http(s) URL).
    pub manifest: String,
    /// Root directory for `kind = "directory"`.
    pub directory: PathBuf,
    pub owner: String,
    pub repo: String,
    /// Repository sub-path for `kind = "contents"`.
    pub path: String,
    pub link: ContentLink,
    pub api_base: String,
    pub cdn_base: String,
    /// Whole-request timeout in seconds for listing and form calls.
    pub timeout_secs: u64,
    /// Connect timeout in seconds for audio fetches and downloads, whose
    /// bodies are not time-bounded.
    pub connect_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Manifest,
            manifest: "database.json".to_string(),
            directory: PathBuf::from("."),
            owner: String::new(),
            repo: String::new(),
            path: "audio".to_string(),
            link: ContentLink::Cdn,
            api_base: "https://api.github.com".to_string(),
            cdn_base: "https://cdn.jsdelivr.net/gh".to_string(),
            timeout_secs: 20,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum age of the cached listing before it is refetched.
    pub ttl_secs: u64,
    /// Storage key; bump the suffix when the cached shape changes.
    pub key: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            key: "vault_tracks_cache_v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserSettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Artist shown when a filename has no `" - "` separator.
    pub artist_fallback: String,
    /// Whether periods count as word separators like underscores.
    pub dots_as_spaces: bool,
    /// Only accept a year token at the very end of the name.
    pub strict_year: bool,
    pub uppercase: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "wav".into(),
                "m4a".into(),
                "flac".into(),
                "ogg".into(),
            ],
            artist_fallback: "OPIUM ARCHIVE".to_string(),
            dots_as_spaces: true,
            strict_year: false,
            uppercase: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowKeys {
    /// Left/right scrub within the current track.
    Seek,
    /// Left/right jump to the previous/next track.
    #[serde(alias = "tracks")]
    Track,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndBehavior {
    #[serde(alias = "next")]
    Advance,
    Stop,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Volume change per key press or wheel notch.
    pub volume_step: f32,
    /// Seconds to scrub when arrow keys are in seek mode.
    pub seek_seconds: u64,
    pub arrow_keys: ArrowKeys,
    pub on_end: EndBehavior,
    /// Move on to the next track when one fails to play.
    pub skip_on_error: bool,
    pub error_skip_delay_ms: u64,
    /// Fade-out duration when quitting (milliseconds).
    pub quit_fade_out_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume_step: 0.05,
            seek_seconds: 5,
            arrow_keys: ArrowKeys::Track,
            on_end: EndBehavior::Advance,
            skip_on_error: true,
            error_skip_delay_ms: 1500,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Delay between the last keystroke and re-filtering; 0 filters immediately.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormEncoding {
    #[serde(alias = "form-data")]
    Multipart,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactSettings {
    /// Form backend URL; the ticket form is disabled when empty.
    pub endpoint: String,
    pub cooldown_minutes: u64,
    pub encoding: FormEncoding,
    /// Require a captcha token before submitting.
    pub captcha: bool,
    /// Close the ticket window this long after a successful send; 0 keeps it open.
    pub auto_close_ms: u64,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            cooldown_minutes: 15,
            encoding: FormEncoding::Multipart,
            captcha: false,
            auto_close_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Show the "enter archive" splash before the main view.
    pub splash: bool,
    /// Language used until the user picks one (`en` or `es`).
    pub default_lang: String,
    /// Label shown under a track when it has neither extra info nor artist.
    pub default_subtitle: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            splash: true,
            default_lang: "en".to_string(),
            default_subtitle: "UNKNOWN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Override for the key-value file; defaults to `<data_dir>/vault/storage.json`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Log file; defaults to `<data_dir>/vault/vault.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info,reqwest=warn,hyper=warn,hyper_util=warn".to_string(),
            file: None,
        }
    }
}

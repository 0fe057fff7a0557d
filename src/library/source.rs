//! Track listings: the four source kinds and their wire formats.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::config::{ContentLink, ParserSettings, SourceKind, SourceSettings};
use crate::error::{FetchError, HttpError};
use crate::http::HttpClient;

use super::format::format_bytes;
use super::model::Track;
use super::parse::{is_audio_name, parse_filename};

/// One file offered by a listing, before filename parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub name: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    #[serde(default)]
    size: u64,
    browser_download_url: String,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    kind: Option<String>,
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    title: String,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    year: Option<Loose>,
    #[serde(default)]
    size: Option<Loose>,
    src: String,
    #[serde(default, alias = "extra_info", alias = "info")]
    extra_info: Option<String>,
    #[serde(default, alias = "upload_date")]
    upload_date: Option<String>,
}

fn get_json<T: DeserializeOwned>(http: &dyn HttpClient, url: &str) -> Result<T, FetchError> {
    let response = http.get(url)?;
    if !response.is_success() {
        return Err(FetchError::from_status(response.status));
    }
    response
        .json()
        .map_err(|e| FetchError::Decode(e.to_string()))
}

pub fn releases_url(source: &SourceSettings) -> String {
    format!(
        "{}/repos/{}/{}/releases",
        source.api_base.trim_end_matches('/'),
        source.owner,
        source.repo
    )
}

pub fn contents_url(source: &SourceSettings) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        source.api_base.trim_end_matches('/'),
        source.owner,
        source.repo,
        source.path.trim_matches('/')
    )
}

fn join_segments(base: &str, segments: &[&str]) -> Result<String, HttpError> {
    let invalid = || HttpError::InvalidUrl(base.to_string());
    let mut url = reqwest::Url::parse(base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(segments.iter().flat_map(|s| s.split('/')).filter(|s| !s.is_empty()));
    Ok(url.to_string())
}

/// `https://cdn.jsdelivr.net/gh/<owner>/<repo>/<path>/<file>`, percent-encoded.
pub fn cdn_url(source: &SourceSettings, file: &str) -> Result<String, HttpError> {
    join_segments(
        &source.cdn_base,
        &[&source.owner, &source.repo, &source.path, file],
    )
}

/// `https://<owner>.github.io/<repo>/<path>/<file>`, percent-encoded.
pub fn pages_url(source: &SourceSettings, file: &str) -> Result<String, HttpError> {
    let base = format!("https://{}.github.io/", source.owner);
    join_segments(&base, &[&source.repo, &source.path, file])
}

fn release_assets(source: &SourceSettings, http: &dyn HttpClient) -> Result<Vec<Asset>, FetchError> {
    let releases: Vec<Release> = get_json(http, &releases_url(source))?;
    Ok(releases
        .into_iter()
        .flat_map(|r| r.assets)
        .map(|a| Asset {
            name: a.name,
            size: a.size,
            url: a.browser_download_url,
            uploaded_at: a.created_at,
        })
        .collect())
}

fn content_assets(source: &SourceSettings, http: &dyn HttpClient) -> Result<Vec<Asset>, FetchError> {
    let entries: Vec<ContentEntry> = get_json(http, &contents_url(source))?;
    let mut assets = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.kind.as_deref().is_some_and(|k| k != "file") {
            continue;
        }
        let url = match source.link {
            ContentLink::Cdn => cdn_url(source, &entry.name)?,
            ContentLink::Pages => pages_url(source, &entry.name)?,
            ContentLink::Direct => match entry.download_url {
                Some(url) => url,
                None => continue,
            },
        };
        assets.push(Asset {
            name: entry.name,
            size: entry.size,
            url,
            uploaded_at: None,
        });
    }
    Ok(assets)
}

fn directory_assets(dir: &Path, parser: &ParserSettings) -> Result<Vec<Asset>, FetchError> {
    if !dir.is_dir() {
        return Err(FetchError::Io {
            path: dir.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_audio_name(name, parser) {
            continue;
        }
        let meta = entry.metadata().ok();
        let uploaded_at = meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
        assets.push(Asset {
            name: name.to_string(),
            size: meta.map(|m| m.len()).unwrap_or(0),
            url: path.display().to_string(),
            uploaded_at,
        });
    }
    Ok(assets)
}

/// Keep audio assets, parse their names and number them from 1.
pub fn tracks_from_assets(assets: Vec<Asset>, parser: &ParserSettings) -> Vec<Track> {
    assets
        .into_iter()
        .filter(|a| is_audio_name(&a.name, parser))
        .zip(1u32..)
        .map(|(asset, id)| {
            let parsed = parse_filename(&asset.name, asset.uploaded_at.as_deref(), parser);
            Track {
                id,
                title: parsed.title,
                artist: parsed.artist,
                year: parsed.year,
                extra_info: parsed.extra_info,
                size: format_bytes(asset.size as f64),
                src: asset.url,
                upload_date: asset.uploaded_at,
            }
        })
        .collect()
}

fn loose_year(value: Option<Loose>) -> Option<u16> {
    let year = match value? {
        Loose::Number(n) if n.fract() == 0.0 => n as i64,
        Loose::Number(_) => return None,
        Loose::Text(s) => s.trim().parse().ok()?,
    };
    u16::try_from(year).ok().filter(|y| (1000..=9999).contains(y))
}

fn loose_size(value: Option<Loose>) -> String {
    match value {
        Some(Loose::Number(n)) => format_bytes(n),
        Some(Loose::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "N/A".to_string(),
    }
}

/// Manifest records are already structured; ids are renumbered to keep them contiguous.
fn tracks_from_manifest(entries: Vec<ManifestEntry>, parser: &ParserSettings) -> Vec<Track> {
    entries
        .into_iter()
        .zip(1u32..)
        .map(|(entry, id)| {
            let artist = entry
                .artist
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| parser.artist_fallback.clone());
            let title = match entry.title.trim() {
                "" => entry.src.rsplit('/').next().unwrap_or_default().to_string(),
                t => t.to_string(),
            };
            Track {
                id,
                title,
                artist,
                year: loose_year(entry.year),
                extra_info: entry.extra_info.filter(|s| !s.trim().is_empty()),
                size: loose_size(entry.size),
                src: entry.src,
                upload_date: entry.upload_date,
            }
        })
        .collect()
}

fn manifest_tracks(
    location: &str,
    parser: &ParserSettings,
    http: &dyn HttpClient,
) -> Result<Vec<Track>, FetchError> {
    let entries: Vec<ManifestEntry> =
        if location.starts_with("http://") || location.starts_with("https://") {
            get_json(http, location)?
        } else {
            let bytes = fs::read(location).map_err(|e| FetchError::Io {
                path: location.to_string(),
                message: e.to_string(),
            })?;
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?
        };
    Ok(tracks_from_manifest(entries, parser))
}

/// Fetch and normalize the configured listing. One request at most.
pub fn fetch_tracks(
    source: &SourceSettings,
    parser: &ParserSettings,
    http: &dyn HttpClient,
) -> Result<Vec<Track>, FetchError> {
    match source.kind {
        SourceKind::Manifest => manifest_tracks(&source.manifest, parser, http),
        SourceKind::Directory => Ok(tracks_from_assets(
            directory_assets(&source.directory, parser)?,
            parser,
        )),
        SourceKind::Releases => Ok(tracks_from_assets(release_assets(source, http)?, parser)),
        SourceKind::Contents => Ok(tracks_from_assets(content_assets(source, http)?, parser)),
    }
}

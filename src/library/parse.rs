//! Filename heuristics that turn an archive asset name into track metadata.
//!
//! The steps always run in the same order: extension, separators, year,
//! bracketed tag, artist/title split, cleanup. A year written inside a tag
//! (`"Song [Leak 2019]"`) is therefore taken as the year, and the tag keeps
//! whatever words remain.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike};
use regex::Regex;

use crate::config::ParserSettings;

static YEAR_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:$|[^0-9])").expect("valid year regex")
});

static YEAR_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s((?:19|20)[0-9]{2})$").expect("valid trailing year regex"));

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\(\[]([^\(\)\[\]]*)[\)\]]").expect("valid bracket regex")
});

static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("valid empty bracket regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub artist: String,
    pub title: String,
    pub year: Option<u16>,
    pub extra_info: Option<String>,
}

/// Whether `name` ends in one of the configured audio extensions.
pub fn is_audio_name(name: &str, settings: &ParserSettings) -> bool {
    audio_stem(name, settings).is_some()
}

fn audio_stem<'a>(name: &'a str, settings: &ParserSettings) -> Option<&'a str> {
    let (stem, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext)
        .then_some(stem)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_separators(s: &str, dots_as_spaces: bool) -> String {
    let replaced: String = s
        .chars()
        .map(|c| match c {
            '_' => ' ',
            '.' if dots_as_spaces => ' ',
            other => other,
        })
        .collect();
    collapse_whitespace(&replaced)
}

fn take_year(residual: &mut String, strict: bool) -> Option<u16> {
    let re = if strict { &YEAR_TRAILING } else { &YEAR_ANYWHERE };
    let (range, year) = {
        let m = re.captures(residual.as_str())?.get(1)?;
        (m.range(), m.as_str().parse::<u16>().ok()?)
    };
    residual.replace_range(range, "");
    *residual = collapse_whitespace(residual.as_str());
    Some(year)
}

fn year_from_timestamp(ts: &str) -> Option<u16> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts.trim()) {
        return u16::try_from(dt.year()).ok();
    }
    // Plain dates such as "2021-05-01" still carry a usable year.
    ts.trim().get(..4)?.parse().ok()
}

fn take_extra_info(residual: &mut String) -> Option<String> {
    let (range, inner) = BRACKETED
        .captures_iter(residual.as_str())
        .last()
        .and_then(|c| Some((c.get(0)?.range(), c.get(1)?.as_str().trim().to_string())))?;
    residual.replace_range(range, "");
    let cleaned = EMPTY_BRACKETS
        .replace_all(residual.as_str(), "")
        .into_owned();
    *residual = collapse_whitespace(&cleaned);
    (!inner.is_empty()).then_some(inner)
}

fn clean_field(s: &str, settings: &ParserSettings) -> String {
    let normalized = normalize_separators(s, settings.dots_as_spaces);
    let trimmed = normalized
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string();
    if settings.uppercase {
        trimmed.to_uppercase()
    } else {
        trimmed
    }
}

/// Parse an asset filename (plus optional upload timestamp) into metadata.
pub fn parse_filename(
    filename: &str,
    upload_timestamp: Option<&str>,
    settings: &ParserSettings,
) -> ParsedName {
    let stem = audio_stem(filename, settings).unwrap_or(filename);
    let mut residual = normalize_separators(stem, settings.dots_as_spaces);

    let year = take_year(&mut residual, settings.strict_year)
        .or_else(|| upload_timestamp.and_then(year_from_timestamp));

    let extra_info = take_extra_info(&mut residual);
    let residual = collapse_whitespace(&EMPTY_BRACKETS.replace_all(&residual, ""));

    let (artist, title) = match residual.split_once(" - ") {
        Some((artist, title)) => (clean_field(artist, settings), clean_field(title, settings)),
        None => (String::new(), clean_field(&residual, settings)),
    };

    let artist = if artist.is_empty() {
        settings.artist_fallback.clone()
    } else {
        artist
    };

    let title = if title.is_empty() {
        let raw = clean_field(stem, settings);
        if raw.is_empty() { filename.to_string() } else { raw }
    } else {
        title
    };

    let extra_info = extra_info.map(|info| {
        if settings.uppercase {
            info.to_uppercase()
        } else {
            info
        }
    });

    ParsedName {
        artist,
        title,
        year,
        extra_info,
    }
}

use serde::{Deserialize, Serialize};

/// One playable archive entry. Immutable once built by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// 1-based position in the listing it was loaded from.
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub year: Option<u16>,
    pub extra_info: Option<String>,
    /// Human-readable size, e.g. `"4.2 MB"`.
    pub size: String,
    /// Playable location: an http(s) URL or a local path.
    pub src: String,
    pub upload_date: Option<String>,
}

impl Track {
    pub fn year_label(&self) -> String {
        match self.year {
            Some(y) => y.to_string(),
            None => "N/A".to_string(),
        }
    }

    /// Secondary line under the title: extra info, else artist, else `default`.
    pub fn subtitle<'a>(&'a self, default: &'a str) -> &'a str {
        self.extra_info
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.artist.trim()).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }

    /// `"Artist - Title"`, or just the title when there is no artist.
    pub fn display_title(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }

    /// Whether `src` must be fetched over the network.
    pub fn is_remote(&self) -> bool {
        self.src.starts_with("http://") || self.src.starts_with("https://")
    }

    /// File name to use when saving this track locally: the last segment of
    /// the (decoded) location, never a path.
    pub fn file_name(&self) -> String {
        let location = if self.is_remote() {
            let path = self.src.split(['?', '#']).next().unwrap_or_default();
            urlencoding::decode(path)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| path.to_string())
        } else {
            self.src.clone()
        };
        let name = sanitize_file_name(location.rsplit(['/', '\\']).next().unwrap_or_default());
        if matches!(name.as_str(), "" | "." | "..") {
            sanitize_file_name(&format!("{:02} - {}.mp3", self.id, self.title))
        } else {
            name
        }
    }
}

const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace characters that are unsafe in file names with `_`.
fn sanitize_file_name(s: &str) -> String {
    s.chars()
        .map(|c| {
            if UNSAFE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

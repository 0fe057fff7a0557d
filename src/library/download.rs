use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::http::HttpClient;

use super::model::Track;

fn io_error(path: &Path, e: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Save `track` into `dir` under its own file name, returning the written path.
pub fn save_track(http: &dyn HttpClient, track: &Track, dir: &Path) -> Result<PathBuf, FetchError> {
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    let target = dir.join(track.file_name());

    if track.is_remote() {
        let response = http.get(&track.src)?;
        if !response.is_success() {
            return Err(FetchError::from_status(response.status));
        }
        fs::write(&target, &response.body).map_err(|e| io_error(&target, e))?;
    } else {
        fs::copy(&track.src, &target).map_err(|e| io_error(Path::new(&track.src), e))?;
    }

    tracing::info!(src = %track.src, path = %target.display(), "saved track");
    Ok(target)
}

//! Turning a track location into a paused `rodio` sink.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::time::Duration;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::http::HttpClient;

/// Encoded audio ready for decoding.
pub(super) enum Payload {
    Bytes(Vec<u8>),
    File(File),
}

pub(super) fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Download or open `src`. Runs on a helper thread, never on the audio thread.
pub(super) fn fetch_payload(http: &dyn HttpClient, src: &str) -> Result<Payload, String> {
    if is_remote(src) {
        let response = http.get(src).map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("HTTP {} for {}", response.status, src));
        }
        Ok(Payload::Bytes(response.body))
    } else {
        File::open(src)
            .map(Payload::File)
            .map_err(|e| format!("failed to open {src}: {e}"))
    }
}

/// Create a paused `Sink` for `payload`, returning it with the decoded length if known.
pub(super) fn create_sink(
    stream: &OutputStream,
    payload: Payload,
    volume: f32,
) -> Result<(Sink, Option<Duration>), String> {
    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.set_volume(volume);
    let duration = match payload {
        Payload::Bytes(bytes) => append(&sink, Decoder::new(Cursor::new(bytes)))?,
        Payload::File(file) => append(&sink, Decoder::new(BufReader::new(file)))?,
    };
    Ok((sink, duration))
}

fn append<R>(sink: &Sink, decoder: Result<Decoder<R>, DecoderError>) -> Result<Option<Duration>, String>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let source = decoder.map_err(|e| format!("failed to decode: {e}"))?;
    let duration = source.total_duration();
    sink.append(source);
    Ok(duration)
}

/// Clamp a seek target into the track, when its length is known.
pub(super) fn clamp_seek(target: Duration, duration: Option<Duration>) -> Duration {
    match duration {
        Some(d) => target.min(d),
        None => target,
    }
}

/// Volume levels for a fade from `from` to silence over `fade_out_ms`.
pub(super) fn fade_steps(from: f32, fade_out_ms: u64) -> (Vec<f32>, Duration) {
    if fade_out_ms == 0 {
        return (vec![0.0], Duration::ZERO);
    }
    let steps: u64 = 20;
    let step = Duration::from_millis((fade_out_ms / steps).max(1));
    let levels = (1..=steps)
        .map(|i| from * (1.0 - i as f32 / steps as f32))
        .collect();
    (levels, step)
}

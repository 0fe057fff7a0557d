use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::http::HttpClient;

use super::sink::{Payload, clamp_seek, create_sink, fade_steps, fetch_payload};
use super::types::{AudioCmd, AudioEvent, FailReason, PlaybackHandle, PlaybackInfo};

pub(super) struct Fetched {
    pub(super) generation: u64,
    pub(super) result: Result<Payload, String>,
}

/// State owned by the audio thread.
pub(super) struct Engine {
    stream: Option<OutputStream>,
    http: Arc<dyn HttpClient>,
    events: Sender<AudioEvent>,
    info: PlaybackHandle,
    fetched_tx: Sender<Fetched>,
    generation: u64,
    /// Generation whose bytes are still being fetched.
    pending: Option<u64>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
    paused: bool,
}

impl Engine {
    pub(super) fn new(
        stream: Option<OutputStream>,
        http: Arc<dyn HttpClient>,
        events: Sender<AudioEvent>,
        info: PlaybackHandle,
        fetched_tx: Sender<Fetched>,
    ) -> Self {
        Self {
            stream,
            http,
            events,
            info,
            fetched_tx,
            generation: 0,
            pending: None,
            sink: None,
            duration: None,
            volume: 1.0,
            paused: true,
        }
    }

    fn emit(&self, event: AudioEvent) {
        tracing::debug!(?event, "audio event");
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        if let Ok(mut info) = self.info.lock() {
            *info = PlaybackInfo {
                generation: self.generation,
                playing: self.sink.is_some() && !self.paused,
                position: self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos),
                duration: self.duration,
            };
        }
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.duration = None;
        self.paused = true;
    }

    fn load(&mut self, generation: u64, src: String, volume: f32) {
        self.drop_sink();
        self.generation = generation;
        self.pending = None;
        self.volume = volume;
        if self.stream.is_none() {
            self.publish();
            self.emit(AudioEvent::Failed {
                generation,
                reason: FailReason::Other("no audio output device".to_string()),
            });
            return;
        }
        self.fetch(generation, src);
    }

    /// Start fetching `src` for `generation` on a helper thread.
    pub(super) fn fetch(&mut self, generation: u64, src: String) {
        self.pending = Some(generation);
        self.publish();
        tracing::info!(generation, %src, "loading track");

        let http = Arc::clone(&self.http);
        let tx = self.fetched_tx.clone();
        thread::spawn(move || {
            let result = fetch_payload(http.as_ref(), &src);
            let _ = tx.send(Fetched { generation, result });
        });
    }

    pub(super) fn fetched(&mut self, fetched: Fetched) {
        let Fetched { generation, result } = fetched;
        if self.pending != Some(generation) {
            tracing::debug!(generation, current = self.generation, "discarding superseded load");
            self.emit(AudioEvent::Failed {
                generation,
                reason: FailReason::Aborted,
            });
            return;
        }
        self.pending = None;

        let started = result.and_then(|payload| match self.stream.as_ref() {
            Some(stream) => create_sink(stream, payload, self.volume),
            None => Err("no audio output device".to_string()),
        });
        match started {
            Ok((sink, duration)) => {
                sink.play();
                self.sink = Some(sink);
                self.duration = duration;
                self.paused = false;
                self.publish();
                self.emit(AudioEvent::Started { generation });
            }
            Err(reason) => {
                tracing::warn!(generation, %reason, "playback failed");
                self.publish();
                self.emit(AudioEvent::Failed {
                    generation,
                    reason: FailReason::Other(reason),
                });
            }
        }
    }

    pub(super) fn command(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Load {
                generation,
                src,
                volume,
            } => self.load(generation, src, volume),
            AudioCmd::Pause => {
                if let Some(s) = self.sink.as_ref() {
                    s.pause();
                    self.paused = true;
                    self.publish();
                    self.emit(AudioEvent::Paused {
                        generation: self.generation,
                    });
                }
            }
            AudioCmd::Resume => {
                if let Some(s) = self.sink.as_ref() {
                    s.play();
                    self.paused = false;
                    self.publish();
                    self.emit(AudioEvent::Started {
                        generation: self.generation,
                    });
                }
            }
            AudioCmd::Seek(target) => {
                if let Some(s) = self.sink.as_ref() {
                    let target = clamp_seek(target, self.duration);
                    if let Err(e) = s.try_seek(target) {
                        tracing::warn!(error = ?e, ?target, "seek failed");
                    }
                    self.publish();
                }
            }
            AudioCmd::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(self.volume);
                }
            }
            AudioCmd::Stop => {
                self.pending = None;
                self.drop_sink();
                self.publish();
            }
            AudioCmd::Quit { fade_out_ms } => {
                if let Some(s) = self.sink.as_ref() {
                    if !self.paused {
                        let (levels, step) = fade_steps(self.volume, fade_out_ms);
                        for level in levels {
                            s.set_volume(level);
                            thread::sleep(step);
                        }
                    }
                }
                self.drop_sink();
                self.publish();
                return false;
            }
        }
        true
    }

    /// Periodic refresh of the shared position and end-of-track detection.
    fn tick(&mut self) {
        let ended = !self.paused && self.sink.as_ref().is_some_and(Sink::empty);
        if ended {
            let generation = self.generation;
            self.drop_sink();
            self.publish();
            tracing::info!(generation, "track ended");
            self.emit(AudioEvent::Ended { generation });
        } else if self.sink.is_some() {
            self.publish();
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    http: Arc<dyn HttpClient>,
    events: Sender<AudioEvent>,
    info: PlaybackHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when the stream is dropped, which would tear the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                tracing::error!(error = %e, "no audio output device");
                None
            }
        };

        let (fetched_tx, fetched_rx) = mpsc::channel::<Fetched>();
        let mut engine = Engine::new(stream, http, events, info, fetched_tx);

        loop {
            while let Ok(fetched) = fetched_rx.try_recv() {
                engine.fetched(fetched);
            }
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(cmd) => {
                    if !engine.command(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

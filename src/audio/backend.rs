//! `rodio`-backed signal source.
//!
//! Loads run on short-lived loader threads and report back over a channel,
//! tagged with the epoch they were started under. Everything else happens on
//! the caller's thread inside `poll_events`, which is expected to be called
//! from the UI loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;

use super::error::{AnalyzerError, PlaybackError};
use super::fetch::{FetchLimits, Media, load_media};
use super::sink::create_sink_at;
use super::source::SignalSource;
use super::tap::SampleTap;
use super::types::{Epoch, SourceEvent, SourceEventKind};

/// Samples kept for analysis; enough for the largest transform we accept.
const MIN_TAP_CAPACITY: usize = 4096;

struct Loaded {
    epoch: Epoch,
    result: Result<Media, PlaybackError>,
}

pub struct RodioSource {
    limits: FetchLimits,
    time_update: Duration,

    /// Opened on the first `play`, kept until `release`.
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    media: Option<Media>,
    tap: SampleTap,

    epoch: Epoch,
    /// The epoch loader threads compare themselves against.
    current_load: Arc<AtomicU64>,
    /// Position the current sink was started at.
    offset: Duration,
    /// Seek requested before the media resolved.
    pending_seek: Option<f64>,
    playing: bool,
    /// `Ended` was already reported for this play-through.
    ended: bool,
    last_time_update: Option<Instant>,

    volume: f32,
    muted: bool,
    looping: bool,

    loads_tx: Sender<Loaded>,
    loads_rx: Receiver<Loaded>,
    events: Vec<SourceEvent>,
}

impl RodioSource {
    pub fn new(settings: &AudioSettings) -> Self {
        let (loads_tx, loads_rx) = unbounded();
        Self {
            limits: FetchLimits {
                timeout: Duration::from_secs(settings.fetch_timeout_secs.max(1)),
                max_bytes: settings.max_download_mb.saturating_mul(1024 * 1024),
            },
            time_update: Duration::from_millis(settings.time_update_ms.max(1)),
            stream: None,
            sink: None,
            media: None,
            tap: SampleTap::new(settings.fft_size.max(MIN_TAP_CAPACITY)),
            epoch: Epoch::default(),
            current_load: Arc::new(AtomicU64::new(Epoch::default().get())),
            offset: Duration::ZERO,
            pending_seek: None,
            playing: false,
            ended: false,
            last_time_update: None,
            volume: settings.volume.clamp(0.0, 1.0),
            muted: false,
            looping: false,
            loads_tx,
            loads_rx,
            events: Vec::new(),
        }
    }

    fn emit(&mut self, kind: SourceEventKind) {
        self.events.push(SourceEvent::new(self.epoch, kind));
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn position(&self) -> f64 {
        let played = self.sink.as_ref().map(Sink::get_pos).unwrap_or_default();
        self.offset.saturating_add(played).as_secs_f64()
    }

    fn clamp_to_media(&self, seconds: f64) -> f64 {
        let seconds = non_negative(seconds);
        match self.media.as_ref().and_then(|m| m.duration) {
            Some(d) => seconds.min(d),
            None => seconds,
        }
    }

    fn ensure_stream(&mut self) -> Result<&OutputStream, PlaybackError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
                tracing::warn!(error = %e, "failed to open audio output");
                PlaybackError::AutoplayBlocked
            })?;
            // rodio logs to stderr when OutputStream is dropped, which would
            // draw over the TUI.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream.as_ref().ok_or(PlaybackError::AutoplayBlocked)
    }

    /// Swap in a fresh sink starting at `self.offset`. Without an open
    /// stream the old sink is only dropped; the next `play` builds one.
    fn rebuild_sink(&mut self) -> Result<(), PlaybackError> {
        let Some(media) = self.media.as_ref() else {
            return Ok(());
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.ended = false;
        let Some(stream) = self.stream.as_ref() else {
            return Ok(());
        };
        let sink = create_sink_at(stream, media, self.offset, &self.tap)?;
        sink.set_volume(self.effective_volume());
        if self.playing {
            sink.play();
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn drain_loads(&mut self) {
        while let Ok(loaded) = self.loads_rx.try_recv() {
            if loaded.epoch != self.epoch {
                tracing::debug!(epoch = %loaded.epoch, "dropping superseded load");
                continue;
            }
            match loaded.result {
                Ok(media) => {
                    let duration = media.duration;
                    self.media = Some(media);
                    if let Some(seconds) = self.pending_seek.take() {
                        self.offset = offset_from_secs(self.clamp_to_media(seconds));
                    }
                    tracing::debug!(epoch = %self.epoch, ?duration, "media ready");
                    self.emit(SourceEventKind::MetadataReady { duration });
                }
                Err(err) => {
                    tracing::warn!(epoch = %self.epoch, error = %err, "load failed");
                    self.emit(SourceEventKind::Error(err));
                }
            }
        }
    }

    fn check_progress(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(drained) = self.sink.as_ref().map(Sink::empty) {
            self.advance(drained, Instant::now());
        }
    }

    /// One progress step while playing: restart or report the end once the
    /// sink has `drained`, otherwise emit a throttled time update.
    fn advance(&mut self, drained: bool, now: Instant) {
        if drained {
            if self.looping {
                self.offset = Duration::ZERO;
                match self.rebuild_sink() {
                    Ok(()) => {
                        self.last_time_update = Some(now);
                        self.emit(SourceEventKind::TimeUpdate { position: 0.0 });
                    }
                    Err(err) => {
                        self.playing = false;
                        self.emit(SourceEventKind::Error(err));
                    }
                }
            } else if !self.ended {
                self.ended = true;
                self.playing = false;
                self.emit(SourceEventKind::Ended);
            }
            return;
        }

        let due = self
            .last_time_update
            .is_none_or(|last| now.duration_since(last) >= self.time_update);
        if due {
            self.last_time_update = Some(now);
            let position = self.position();
            self.emit(SourceEventKind::TimeUpdate { position });
        }
    }
}

impl SignalSource for RodioSource {
    fn load(&mut self, resource: &str, epoch: Epoch) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.media = None;
        self.epoch = epoch;
        self.offset = Duration::ZERO;
        self.pending_seek = None;
        self.playing = false;
        self.ended = false;
        self.last_time_update = None;
        self.tap.clear();
        self.current_load.store(epoch.get(), Ordering::Relaxed);

        let tx = self.loads_tx.clone();
        let limits = self.limits;
        let current = Arc::clone(&self.current_load);
        let resource_owned = resource.to_string();
        let spawned = thread::Builder::new()
            .name("encore-loader".to_string())
            .spawn(move || {
                let superseded = || current.load(Ordering::Relaxed) != epoch.get();
                let result = load_media(&resource_owned, limits, &superseded);
                if superseded() {
                    tracing::debug!(%epoch, "loader abandoned");
                    return;
                }
                // The receiver is gone only when the source was dropped.
                let _ = tx.send(Loaded { epoch, result });
            });

        match spawned {
            Ok(_) => tracing::debug!(%epoch, resource, "load started"),
            Err(e) => self.emit(SourceEventKind::Error(PlaybackError::NetworkStall(format!(
                "could not start loader: {e}"
            )))),
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_stream()?;
        self.playing = true;
        self.last_time_update = None;
        if self.media.is_none() {
            return Ok(());
        }
        if self.sink.is_none() || self.ended {
            if self.ended {
                self.offset = Duration::ZERO;
            }
            if let Err(err) = self.rebuild_sink() {
                self.playing = false;
                return Err(err);
            }
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, seconds: f64) {
        if self.media.is_none() {
            self.pending_seek = Some(non_negative(seconds));
            return;
        }
        self.offset = offset_from_secs(self.clamp_to_media(seconds));
        self.last_time_update = None;
        if let Err(err) = self.rebuild_sink() {
            self.playing = false;
            self.emit(SourceEventKind::Error(err));
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        let effective = self.effective_volume();
        if let Some(sink) = &self.sink {
            sink.set_volume(effective);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let effective = self.effective_volume();
        if let Some(sink) = &self.sink {
            sink.set_volume(effective);
        }
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn poll_events(&mut self) -> Vec<SourceEvent> {
        self.drain_loads();
        self.check_progress();
        std::mem::take(&mut self.events)
    }

    fn analysis_tap(&mut self) -> Result<SampleTap, AnalyzerError> {
        Ok(self.tap.clone())
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.media = None;
        self.playing = false;
        self.stream = None;
        // Lets any loader still running see itself as superseded.
        self.current_load.store(self.epoch.next().get(), Ordering::Relaxed);
        self.tap.clear();
        while self.loads_rx.try_recv().is_ok() {}
        self.events.clear();
    }
}

/// Non-finite and negative positions count as the start of the track.
fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

fn offset_from_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(non_negative(seconds)).unwrap_or(Duration::MAX)
}

impl Drop for RodioSource {
    fn drop(&mut self) {
        self.release();
    }
}

//! The playback state machine.
//!
//! `PlaybackController` owns the signal source, the spectrum analyzer and the
//! per-frame task. UI intents come in through the methods below (or
//! [`PlaybackController::apply`]); source events come in through
//! [`PlaybackController::pump_events`]. Every event carries the epoch of the
//! load that produced it, and events from a replaced load are dropped before
//! they can touch the state.

use std::time::{Duration, Instant};

use crate::catalog::Track;
use crate::config::Settings;

use super::analyzer::SpectrumAnalyzer;
use super::error::PlaybackError;
use super::frame_task::FrameTask;
use super::source::SignalSource;
use super::types::{Epoch, Intent, PlaybackState, SourceEvent, SourceEventKind, Status};
use super::visualization::{VisualizationFrame, reduce};

/// Controller knobs, usually derived from [`Settings`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Start playing as soon as metadata resolves.
    pub autoplay: bool,
    pub fft_size: usize,
    pub frame_interval: Duration,
    /// Toggles closer together than this collapse into one.
    pub toggle_debounce: Duration,
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ControllerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            autoplay: settings.audio.autoplay,
            fft_size: settings.audio.fft_size,
            frame_interval: Duration::from_millis(settings.audio.frame_interval_ms),
            toggle_debounce: Duration::from_millis(settings.controls.toggle_debounce_ms),
            volume: settings.audio.volume,
            shuffle: settings.playback.shuffle,
            repeat: settings.playback.repeat,
        }
    }
}

enum AnalyzerSlot {
    /// Not attached yet; attached on the first track selection.
    Pending,
    Ready(SpectrumAnalyzer),
    /// Attaching failed; frames stay flat for the controller's lifetime.
    Unavailable,
}

pub struct PlaybackController<S: SignalSource> {
    source: S,
    config: ControllerConfig,
    state: PlaybackState,
    track: Option<Track>,
    epoch: Epoch,
    analyzer: AnalyzerSlot,
    frame: VisualizationFrame,
    frame_task: FrameTask,
    last_toggle: Option<Instant>,
    revision: u64,
}

impl<S: SignalSource> PlaybackController<S> {
    pub fn new(mut source: S, config: ControllerConfig) -> Self {
        let state = PlaybackState {
            volume: config.volume.clamp(0.0, 1.0),
            shuffle: config.shuffle,
            repeat: config.repeat,
            ..PlaybackState::default()
        };
        source.set_volume(state.volume);
        source.set_loop(state.repeat);

        Self {
            source,
            frame_task: FrameTask::new(config.frame_interval),
            config,
            state,
            track: None,
            epoch: Epoch::default(),
            analyzer: AnalyzerSlot::Pending,
            frame: VisualizationFrame::flat(),
            last_toggle: None,
            revision: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Latest visualization frame. Flat until the first tick after a track
    /// starts playing, and whenever no analyzer is available.
    pub fn frame(&self) -> &VisualizationFrame {
        &self.frame
    }

    #[cfg(test)]
    pub fn current_track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    #[cfg(test)]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[cfg(test)]
    pub fn frame_task(&self) -> &FrameTask {
        &self.frame_task
    }

    #[cfg(test)]
    pub fn analyzer_available(&self) -> bool {
        matches!(self.analyzer, AnalyzerSlot::Ready(_))
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::SelectTrack(track) => self.select_track(track),
            Intent::TogglePlay => self.toggle_play(),
            Intent::Seek(seconds) => self.seek(seconds),
            Intent::SeekBy(delta) => self.seek_by(delta),
            Intent::SetVolume(v) => self.set_volume(v),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::ToggleShuffle => self.toggle_shuffle(),
            Intent::ToggleRepeat => self.toggle_repeat(),
            Intent::Retry => self.retry(),
        }
    }

    pub fn select_track(&mut self, track: Track) {
        self.epoch = self.epoch.next();
        self.frame_task.cancel();
        self.frame = VisualizationFrame::flat();

        self.state.track_id = Some(track.id);
        self.state.position_secs = 0.0;
        self.state.duration_secs = None;
        self.state.error = None;
        self.set_status(Status::Loading);

        self.prepare_analyzer();
        tracing::info!(epoch = %self.epoch, track = %track.display(), "loading track");
        self.source.load(&track.audio_url, self.epoch);
        self.track = Some(track);
        self.touch();
    }

    /// Re-select the current track, e.g. after a decode or network failure.
    pub fn retry(&mut self) {
        if let Some(track) = self.track.clone() {
            self.select_track(track);
        }
    }

    pub fn toggle_play(&mut self) {
        self.toggle_play_at(Instant::now());
    }

    /// Like [`Self::toggle_play`] with an explicit clock.
    pub fn toggle_play_at(&mut self, now: Instant) {
        let debounced = self
            .last_toggle
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.toggle_debounce);
        if debounced {
            tracing::trace!("toggle debounced");
            return;
        }

        match self.state.status {
            Status::Playing => {
                self.source.pause();
                self.set_status(Status::Paused);
            }
            Status::Paused => self.start_playback(),
            Status::Ended => {
                // A seek made after the end is kept.
                let at_end = self
                    .state
                    .duration_secs
                    .is_none_or(|d| self.state.position_secs >= d);
                if at_end {
                    self.source.seek(0.0);
                    self.state.position_secs = 0.0;
                }
                self.start_playback();
            }
            Status::Idle | Status::Loading | Status::Errored => return,
        }
        self.last_toggle = Some(now);
        self.touch();
    }

    /// Move the play head. Ignored while idle. Clamped to `[0, duration]`
    /// once the duration is known and to non-negative before that; a
    /// non-finite target means the start.
    pub fn seek(&mut self, seconds: f64) {
        if self.state.status == Status::Idle {
            return;
        }
        let target = self.clamp_position(seconds);
        self.source.seek(target);
        self.state.position_secs = target;
        self.touch();
    }

    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.state.position_secs + delta);
    }

    /// Set the output volume, clamped to `[0, 1]`. Zero also marks the
    /// player muted and any audible volume unmutes it.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.state.muted = volume == 0.0;
        self.source.set_volume(volume);
        self.source.set_muted(self.state.muted);
        self.touch();
    }

    pub fn toggle_mute(&mut self) {
        self.state.muted = !self.state.muted;
        self.source.set_muted(self.state.muted);
        self.touch();
    }

    /// Flip the advisory shuffle flag. The playlist decides what it means.
    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle = !self.state.shuffle;
        self.touch();
    }

    pub fn toggle_repeat(&mut self) {
        self.state.repeat = !self.state.repeat;
        self.source.set_loop(self.state.repeat);
        self.touch();
    }

    /// Drain the source's pending events and fold them into the state.
    /// Returns whether anything observable changed.
    pub fn pump_events(&mut self) -> bool {
        let before = self.revision;
        for event in self.source.poll_events() {
            self.handle_event(event);
        }
        self.revision != before
    }

    pub fn handle_event(&mut self, event: SourceEvent) {
        if event.epoch != self.epoch {
            tracing::trace!(
                stale = %event.epoch,
                current = %self.epoch,
                "ignoring event from a replaced load"
            );
            return;
        }

        match event.kind {
            SourceEventKind::MetadataReady { duration } => {
                if self.state.status != Status::Loading {
                    return;
                }
                self.state.duration_secs = duration;
                self.state.position_secs = self.clamp_position(self.state.position_secs);
                tracing::info!(epoch = %self.epoch, ?duration, "metadata ready");
                if self.config.autoplay {
                    self.start_playback();
                } else {
                    self.set_status(Status::Paused);
                }
            }
            SourceEventKind::TimeUpdate { position } => {
                if !matches!(self.state.status, Status::Playing | Status::Paused) {
                    return;
                }
                self.state.position_secs = self.clamp_position(position);
            }
            SourceEventKind::Ended => {
                if self.state.status != Status::Playing {
                    return;
                }
                if self.state.repeat {
                    self.source.seek(0.0);
                    self.state.position_secs = 0.0;
                    self.start_playback();
                } else {
                    if let Some(d) = self.state.duration_secs {
                        self.state.position_secs = d;
                    }
                    self.set_status(Status::Ended);
                }
            }
            SourceEventKind::Error(err) => {
                if self.state.status == Status::Idle {
                    return;
                }
                self.fail(err);
            }
        }
        self.touch();
    }

    /// Run one animation tick if the frame task is due. Returns whether a
    /// new frame was produced.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if !self.frame_task.poll(now) {
            return false;
        }
        self.frame = match &mut self.analyzer {
            AnalyzerSlot::Ready(analyzer) => reduce(analyzer.sample()),
            AnalyzerSlot::Pending | AnalyzerSlot::Unavailable => VisualizationFrame::flat(),
        };
        self.touch();
        true
    }

    /// Time until the next animation tick, if the frame task is running.
    pub fn next_frame_in(&self, now: Instant) -> Option<Duration> {
        self.frame_task.time_until_due(now)
    }

    fn start_playback(&mut self) {
        match self.source.play() {
            Ok(()) => self.set_status(Status::Playing),
            Err(PlaybackError::AutoplayBlocked) => {
                tracing::warn!(epoch = %self.epoch, "playback start blocked; staying paused");
                self.set_status(Status::Paused);
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: PlaybackError) {
        if err == PlaybackError::AutoplayBlocked {
            // Not a fault: fall back to paused so the next toggle retries.
            if matches!(self.state.status, Status::Playing | Status::Loading) {
                self.source.pause();
                self.set_status(Status::Paused);
            }
            return;
        }
        tracing::error!(epoch = %self.epoch, error = %err, "playback failed");
        self.state.error = Some(err.kind());
        self.set_status(Status::Errored);
    }

    /// The only place status changes, so the frame task always follows it.
    fn set_status(&mut self, status: Status) {
        let old = self.state.status;
        if status == Status::Playing {
            if old != Status::Playing || !self.frame_task.is_armed() {
                self.frame_task.start(Instant::now());
            }
        } else {
            self.frame_task.cancel();
        }
        if matches!(status, Status::Ended | Status::Errored) {
            self.frame = VisualizationFrame::flat();
        }
        if old != status {
            tracing::debug!(epoch = %self.epoch, from = old.label(), to = status.label(), "status");
        }
        self.state.status = status;
    }

    /// Attach the analyzer on first use, and re-attach on every track when
    /// the source cannot keep a tap across loads.
    fn prepare_analyzer(&mut self) {
        match &mut self.analyzer {
            AnalyzerSlot::Ready(analyzer) if self.source.retains_tap_across_loads() => {
                analyzer.reset();
                return;
            }
            AnalyzerSlot::Unavailable => return,
            AnalyzerSlot::Ready(_) | AnalyzerSlot::Pending => {}
        }

        let attached = self
            .source
            .analysis_tap()
            .and_then(|tap| SpectrumAnalyzer::new(tap, self.config.fft_size));
        self.analyzer = match attached {
            Ok(analyzer) => AnalyzerSlot::Ready(analyzer),
            Err(err) => {
                tracing::warn!(error = %err, "visualization disabled");
                AnalyzerSlot::Unavailable
            }
        };
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        match self.state.duration_secs {
            Some(d) => seconds.min(d),
            None => seconds,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<S: SignalSource> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        self.frame_task.cancel();
        self.source.release();
    }
}

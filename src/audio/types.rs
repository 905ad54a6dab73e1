//! Small shared types of the playback engine.
//!
//! Transport status, the observable playback snapshot, load epochs and the
//! lifecycle events a signal source reports back to the controller, and the
//! intents the UI sends it.

use std::fmt;

use crate::catalog::Track;

use super::error::{ErrorKind, PlaybackError};

/// Transport status of the player.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Status {
    /// Nothing has been selected yet.
    #[default]
    Idle,
    /// A track was selected and its metadata has not resolved yet.
    Loading,
    Playing,
    Paused,
    /// The track played to its end with repeat off.
    Ended,
    /// The source reported a decode or network failure.
    Errored,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
            Self::Errored => "Error",
        }
    }
}

/// Generation counter for track loads.
///
/// Bumped on every track selection; source events carry the epoch of the
/// load they belong to so late events from a replaced track can be dropped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only snapshot of the player, handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub track_id: Option<u64>,
    pub status: Status,
    pub position_secs: f64,
    /// `None` until the source has resolved the track's metadata. A resolved
    /// zero means a genuinely empty track.
    pub duration_secs: Option<f64>,
    pub volume: f32,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: bool,
    /// Set while `status` is `Errored`.
    pub error: Option<ErrorKind>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            track_id: None,
            status: Status::Idle,
            position_secs: 0.0,
            duration_secs: None,
            volume: 0.7,
            muted: false,
            shuffle: false,
            repeat: false,
            error: None,
        }
    }
}

impl PlaybackState {
    /// Playback progress in `[0, 1]`, or `None` while the duration is unknown
    /// or zero.
    pub fn progress(&self) -> Option<f64> {
        match self.duration_secs {
            Some(d) if d > 0.0 => Some((self.position_secs / d).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Lifecycle notifications from a signal source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEventKind {
    /// Duration resolved (`None` for streams that do not report one).
    MetadataReady { duration: Option<f64> },
    TimeUpdate { position: f64 },
    Ended,
    Error(PlaybackError),
}

/// A lifecycle event tagged with the epoch of the load that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub epoch: Epoch,
    pub kind: SourceEventKind,
}

impl SourceEvent {
    pub fn new(epoch: Epoch, kind: SourceEventKind) -> Self {
        Self { epoch, kind }
    }
}

/// A user intent addressed to the playback controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectTrack(Track),
    TogglePlay,
    Seek(f64),
    /// Relative seek, used by the scrub keys.
    SeekBy(f64),
    SetVolume(f32),
    ToggleMute,
    ToggleShuffle,
    ToggleRepeat,
    /// Re-select the current track after a failure.
    Retry,
}

use thiserror::Error;

/// Failures a signal source can report.
///
/// None of these are fatal to the process; the controller absorbs all of
/// them and reflects the outcome in its playback state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The platform refused to start audio output. Recoverable: the player
    /// falls back to paused and the next play intent tries again.
    #[error("audio output could not be started")]
    AutoplayBlocked,
    #[error("decode failure: {0}")]
    DecodeFailure(String),
    #[error("network stall: {0}")]
    NetworkStall(String),
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AutoplayBlocked => ErrorKind::AutoplayBlocked,
            Self::DecodeFailure(_) => ErrorKind::DecodeFailure,
            Self::NetworkStall(_) => ErrorKind::NetworkStall,
        }
    }
}

/// Payload-free error classification kept in `PlaybackState`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    AutoplayBlocked,
    DecodeFailure,
    NetworkStall,
}

impl ErrorKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::AutoplayBlocked => "audio output blocked",
            Self::DecodeFailure => "track could not be decoded",
            Self::NetworkStall => "track could not be fetched",
        }
    }
}

/// The spectrum analyzer could not be attached. Visualization degrades to
/// flat bars; playback is unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("spectrum analysis unavailable: {0}")]
    Unavailable(String),
}

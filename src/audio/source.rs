use super::error::{AnalyzerError, PlaybackError};
use super::tap::SampleTap;
use super::types::{Epoch, SourceEvent};

/// Owner of one playable audio resource at a time and its transport.
///
/// Implementations report lifecycle changes as [`SourceEvent`]s, tagged
/// with the epoch passed to the `load` that produced them, and delivered in
/// the order they happened.
pub trait SignalSource {
    /// Replace the active resource and start buffering it. Events from any
    /// previous load must no longer be reported under `epoch`.
    fn load(&mut self, resource: &str, epoch: Epoch);

    /// Start or resume output.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Move the play head. Clamped to `[0, duration]` once the duration is
    /// known; before that the request is held and applied on resolution.
    fn seek(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    /// Restart from the beginning instead of ending.
    fn set_loop(&mut self, looping: bool);

    /// Events that happened since the previous call, oldest first.
    fn poll_events(&mut self) -> Vec<SourceEvent>;

    /// Passive tap on the output signal for spectrum analysis.
    fn analysis_tap(&mut self) -> Result<SampleTap, AnalyzerError>;

    /// Whether a tap obtained earlier keeps receiving audio after `load`.
    /// When false the analyzer is rebuilt for every track.
    fn retains_tap_across_loads(&self) -> bool {
        true
    }

    /// Stop output and free the underlying resource and output device.
    fn release(&mut self);
}

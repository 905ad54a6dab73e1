//! Audio playback and visualization engine.
//!
//! - `source`/`backend`: the `SignalSource` seam and its rodio implementation.
//! - `analyzer`/`visualization`: spectrum snapshots and their reduction to bars.
//! - `controller`: the epoch-tagged playback state machine that ties them together.

mod analyzer;
mod backend;
mod controller;
mod error;
mod fetch;
mod frame_task;
mod sink;
mod source;
mod tap;
mod types;
mod visualization;

pub use backend::RodioSource;
pub use controller::{ControllerConfig, PlaybackController};
pub use source::SignalSource;
pub use types::{Intent, PlaybackState, Status};
pub use visualization::{BARS, VisualizationFrame};

#[cfg(test)]
pub use visualization::reduce;

//! Building `rodio` sinks from in-memory media.
//!
//! Seeking rebuilds the sink: a fresh decoder over the same bytes, skipped
//! forward to the requested position and wrapped with the analysis tap.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::error::PlaybackError;
use super::fetch::Media;
use super::tap::{SampleTap, TapSource};

/// Create a paused `Sink` for `media` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    media: &Media,
    start_at: Duration,
    tap: &SampleTap,
) -> Result<Sink, PlaybackError> {
    let source = Decoder::new(Cursor::new(media.bytes.clone()))
        .map_err(|e| PlaybackError::DecodeFailure(e.to_string()))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(TapSource::new(source, tap.clone()));
    sink.pause();
    Ok(sink)
}

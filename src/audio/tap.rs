//! Passive sample tap between the decoder and the output.
//!
//! `TapSource` wraps any rodio source and yields its samples unchanged while
//! copying a mono mixdown into a shared `SampleTap`. The tap outlives the
//! sources wrapped around it, so swapping tracks never rebuilds it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::source::SeekError;
use rodio::{ChannelCount, SampleRate, Source};

/// Fixed-capacity ring of the most recent mono samples.
#[derive(Debug)]
struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
}

/// Shared handle to the tapped signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SampleTap {
    ring: Arc<Mutex<SampleRing>>,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Arc::new(Mutex::new(SampleRing {
                samples: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity
    }

    pub fn push(&self, sample: f32) {
        self.ring.lock().push(sample);
    }

    /// Fill `out` with the newest samples, oldest first. When fewer samples
    /// are buffered than `out` holds, the front is zero-filled.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let ring = self.ring.lock();
        let available = ring.samples.len().min(out.len());
        let pad = out.len() - available;
        out[..pad].fill(0.0);
        let skip = ring.samples.len() - available;
        for (dst, &src) in out[pad..].iter_mut().zip(ring.samples.iter().skip(skip)) {
            *dst = src;
        }
    }

    /// Drop everything buffered, e.g. when a new track is loaded.
    pub fn clear(&self) {
        self.ring.lock().samples.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ring.lock().samples.len()
    }
}

/// Source adapter that forwards samples untouched and feeds the tap.
pub struct TapSource<S> {
    inner: S,
    tap: SampleTap,
    frame_sum: f32,
    frame_pos: u16,
}

impl<S> TapSource<S>
where
    S: Source,
{
    pub fn new(inner: S, tap: SampleTap) -> Self {
        Self {
            inner,
            tap,
            frame_sum: 0.0,
            frame_pos: 0,
        }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next()?;

        let channels = self.inner.channels().max(1);
        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            self.tap.push(self.frame_sum / f32::from(channels));
            self.frame_sum = 0.0;
            self.frame_pos = 0;
        }

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Source for TapSource<S>
where
    S: Source,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.inner.try_seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn passes_samples_through_unchanged() {
        let input: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
        let tap = SampleTap::new(128);
        let source = TapSource::new(SamplesBuffer::new(1, 44_100, input.clone()), tap.clone());

        let output: Vec<f32> = source.collect();
        assert_eq!(output, input);
        assert_eq!(tap.len(), 64);
    }

    #[test]
    fn mixes_stereo_frames_down_to_mono() {
        let input = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let tap = SampleTap::new(8);
        let source = TapSource::new(SamplesBuffer::new(2, 44_100, input), tap.clone());
        assert_eq!(source.channels(), 2);
        let _ = source.count();

        let mut out = [9.0f32; 3];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn ring_keeps_only_the_newest_samples() {
        let tap = SampleTap::new(4);
        for i in 0..10 {
            tap.push(i as f32);
        }
        assert_eq!(tap.len(), 4);

        let mut out = [0.0f32; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn copy_latest_zero_pads_the_front() {
        let tap = SampleTap::new(16);
        tap.push(0.25);
        tap.push(0.75);

        let mut out = [1.0f32; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.25, 0.75]);

        tap.clear();
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0; 4]);
    }
}

//! FFT spectrum analyzer over the tapped output signal.
//!
//! Produces byte magnitudes in the same shape a browser `AnalyserNode`
//! reports them: `fft_size / 2` bins, Blackman-windowed, smoothed over time,
//! mapped from decibels onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::error::AnalyzerError;
use super::tap::SampleTap;

/// Time smoothing between consecutive snapshots.
const SMOOTHING: f32 = 0.8;
/// Decibel range mapped onto `0..=255`.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

pub struct SpectrumAnalyzer {
    tap: SampleTap,
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    /// Pre-allocated FFT buffer, reused every snapshot.
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyzer {
    /// Attach an analyzer to `tap`. `fft_size` must be a power of two no
    /// larger than the tap's capacity.
    pub fn new(tap: SampleTap, fft_size: usize) -> Result<Self, AnalyzerError> {
        if !fft_size.is_power_of_two() || fft_size < 2 {
            return Err(AnalyzerError::Unavailable(format!(
                "transform size {fft_size} is not a power of two"
            )));
        }
        if tap.capacity() < fft_size {
            return Err(AnalyzerError::Unavailable(format!(
                "tap holds {} samples, transform needs {fft_size}",
                tap.capacity()
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window
        let n = fft_size as f32;
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / n;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        let bins = fft_size / 2;
        Ok(Self {
            tap,
            fft_size,
            fft,
            window,
            samples: vec![0.0; fft_size],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
        })
    }

    /// Number of magnitude bins per snapshot (half the transform size).
    #[cfg(test)]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Take a snapshot of the current spectrum.
    pub fn sample(&mut self) -> &[u8] {
        self.tap.copy_latest(&mut self.samples);

        for ((slot, &s), &w) in self.buffer.iter_mut().zip(&self.samples).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let range = MAX_DB - MIN_DB;
        for ((bin, smoothed), byte) in self
            .buffer
            .iter()
            .zip(self.smoothed.iter_mut())
            .zip(self.bytes.iter_mut())
        {
            let magnitude = bin.norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
            let db = 20.0 * smoothed.log10();
            let scaled = (db - MIN_DB) * (255.0 / range);
            // -inf for silent bins clamps to 0
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }

        &self.bytes
    }

    /// Forget smoothing history, so the next snapshot reflects only new audio.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }
}

//! Reduction of a magnitude snapshot into the handful of bars shown on screen.

/// Number of bars in a visualization frame.
pub const BARS: usize = 20;

/// Normalized bar heights in `[0, 1]`, regenerated every animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualizationFrame([f32; BARS]);

impl VisualizationFrame {
    /// All bars at zero: what is shown before the first tick, after a track
    /// change, or when no analyzer is available.
    pub fn flat() -> Self {
        Self([0.0; BARS])
    }

    pub fn bars(&self) -> &[f32; BARS] {
        &self.0
    }

    #[cfg(test)]
    pub fn is_flat(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

/// Average `raw` into [`BARS`] contiguous chunks of `raw.len() / BARS` bytes
/// each and normalize by 255.
///
/// Trailing bytes that do not fill a whole chunk are ignored. A buffer
/// shorter than [`BARS`] yields a flat frame.
pub fn reduce(raw: &[u8]) -> VisualizationFrame {
    let chunk = raw.len() / BARS;
    if chunk == 0 {
        return VisualizationFrame::flat();
    }

    let mut bars = [0.0f32; BARS];
    for (bar, bytes) in bars.iter_mut().zip(raw.chunks_exact(chunk)) {
        let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
        *bar = (sum as f32 / chunk as f32 / 255.0).clamp(0.0, 1.0);
    }
    VisualizationFrame(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_buffer_reduces_to_all_ones() {
        let frame = reduce(&[255u8; 200]);
        assert!(frame.bars().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn silent_buffer_reduces_to_all_zeros() {
        let frame = reduce(&[0u8; 200]);
        assert!(frame.is_flat());
    }

    #[test]
    fn each_bar_averages_its_own_chunk() {
        // 200 bytes -> chunks of 10; chunk i holds the value i * 10
        let raw: Vec<u8> = (0..200).map(|i| (i / 10 * 10) as u8).collect();
        let frame = reduce(&raw);
        for (i, &v) in frame.bars().iter().enumerate() {
            let expected = (i * 10) as f32 / 255.0;
            assert!((v - expected).abs() < 1e-6, "bar {i}: {v} != {expected}");
        }
    }

    #[test]
    fn remainder_bytes_are_dropped() {
        // 128 bins (a 256-point transform) -> chunk 6, last 8 bytes ignored
        let mut raw = vec![0u8; 128];
        raw[120..].fill(255);
        let frame = reduce(&raw);
        assert!(frame.is_flat());
    }

    #[test]
    fn output_is_always_twenty_values_in_unit_range() {
        for len in [0usize, 1, 19, 20, 21, 128, 200, 1024, 1031] {
            let raw: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
            let frame = reduce(&raw);
            assert_eq!(frame.bars().len(), BARS);
            assert!(frame.bars().iter().all(|v| (0.0..=1.0).contains(v)), "len {len}");
        }
    }

    #[test]
    fn short_buffers_yield_a_flat_frame() {
        assert!(reduce(&[255u8; 19]).is_flat());
        assert!(reduce(&[]).is_flat());
    }

    #[test]
    fn reduction_is_deterministic() {
        let raw: Vec<u8> = (0..300).map(|i| (i % 251) as u8).collect();
        assert_eq!(reduce(&raw), reduce(&raw));
    }
}

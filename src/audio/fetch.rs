//! Fetching and probing track resources.
//!
//! Everything here runs on a loader thread: the whole resource is read into
//! memory once, so later seeks can rebuild decoders without touching the
//! network again.

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::AudioFile;
use lofty::probe::Probe;
use rodio::{Decoder, Source};

use super::error::PlaybackError;

/// An in-memory, decodable resource.
#[derive(Clone)]
pub(super) struct Media {
    pub bytes: Arc<[u8]>,
    /// Resolved duration in seconds, if the container reports one.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: u64,
}

fn is_remote(resource: &str) -> bool {
    let lower = resource.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Bytes read from a remote body between checks for a replaced load.
const CHUNK: usize = 64 * 1024;

fn abandoned() -> PlaybackError {
    PlaybackError::NetworkStall("load superseded".to_string())
}

/// Read the raw bytes behind `resource`: an `http(s)://` URL, a `file://`
/// URL or a plain path. Remote reads stop as soon as `superseded` says the
/// load was replaced.
pub(super) fn fetch(
    resource: &str,
    limits: FetchLimits,
    superseded: &dyn Fn() -> bool,
) -> Result<Arc<[u8]>, PlaybackError> {
    if superseded() {
        return Err(abandoned());
    }
    if is_remote(resource) {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(limits.timeout))
            .build()
            .into();
        let mut response = agent
            .get(resource)
            .call()
            .map_err(|e| PlaybackError::NetworkStall(e.to_string()))?;
        let mut reader = response
            .body_mut()
            .with_config()
            .limit(limits.max_bytes)
            .reader();
        let mut bytes = Vec::new();
        let mut chunk = vec![0u8; CHUNK];
        loop {
            if superseded() {
                return Err(abandoned());
            }
            let n = reader
                .read(&mut chunk)
                .map_err(|e| PlaybackError::NetworkStall(e.to_string()))?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
        }
        return Ok(bytes.into());
    }

    let path = resource.strip_prefix("file://").unwrap_or(resource);
    let bytes = std::fs::read(path)
        .map_err(|e| PlaybackError::NetworkStall(format!("{path}: {e}")))?;
    Ok(bytes.into())
}

/// Check that `bytes` decode and resolve their duration.
///
/// The decoder's own duration wins; the container tags are the fallback. A
/// zero duration from tags alone is treated as unknown.
pub(super) fn probe(bytes: Arc<[u8]>) -> Result<Media, PlaybackError> {
    let decoder = Decoder::new(Cursor::new(bytes.clone()))
        .map_err(|e| PlaybackError::DecodeFailure(e.to_string()))?;

    let duration = decoder
        .total_duration()
        .map(|d| d.as_secs_f64())
        .or_else(|| tagged_duration(&bytes));

    Ok(Media { bytes, duration })
}

fn tagged_duration(bytes: &[u8]) -> Option<f64> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let secs = tagged.properties().duration().as_secs_f64();
    (secs > 0.0).then_some(secs)
}

/// Fetch, then check that the bytes decode. The decode is skipped when the
/// load was replaced while the bytes were in flight.
pub(super) fn load_media(
    resource: &str,
    limits: FetchLimits,
    superseded: &dyn Fn() -> bool,
) -> Result<Media, PlaybackError> {
    let bytes = fetch(resource, limits, superseded)?;
    if superseded() {
        return Err(abandoned());
    }
    probe(bytes)
}

/// A mono 16-bit PCM WAV file with a quiet sine, for tests.
#[cfg(test)]
pub(super) fn test_wav(sample_rate: u32, samples: usize) -> Vec<u8> {
    let data_len = (samples * 2) as u32;
    let mut out = Vec::with_capacity(44 + samples * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let v = ((i as f32 * 0.05).sin() * 8000.0) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: FetchLimits = FetchLimits {
        timeout: Duration::from_secs(1),
        max_bytes: 1 << 20,
    };

    fn current() -> bool {
        false
    }

    #[test]
    fn missing_file_is_a_network_stall() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.mp3");
        let err = fetch(missing.to_str().unwrap(), LIMITS, &current).unwrap_err();
        assert!(matches!(err, PlaybackError::NetworkStall(_)));
    }

    #[test]
    fn fetch_accepts_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.bin");
        std::fs::write(&p, b"abc").unwrap();

        let bytes = fetch(&format!("file://{}", p.display()), LIMITS, &current).unwrap();
        assert_eq!(&bytes[..], b"abc");
    }

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let err = probe(Arc::from(&b"definitely not audio"[..])).err().unwrap();
        assert!(matches!(err, PlaybackError::DecodeFailure(_)));
    }

    #[test]
    fn wav_probe_resolves_duration() {
        let media = probe(test_wav(8_000, 8_000).into()).unwrap();
        let d = media.duration.unwrap();
        assert!((d - 1.0).abs() < 0.01, "duration {d}");
    }

    #[test]
    fn load_media_reads_and_probes_a_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tone.wav");
        std::fs::write(&p, test_wav(8_000, 4_000)).unwrap();

        let media = load_media(p.to_str().unwrap(), LIMITS, &current).unwrap();
        assert!((media.duration.unwrap() - 0.5).abs() < 0.01);
    }

    #[test]
    fn replaced_load_skips_reading_and_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("junk.mp3");
        std::fs::write(&p, b"not audio at all").unwrap();
        let path = p.to_str().unwrap();

        // left alone this would be a decode failure
        assert!(matches!(
            load_media(path, LIMITS, &current).err().unwrap(),
            PlaybackError::DecodeFailure(_)
        ));
        let err = load_media(path, LIMITS, &|| true).err().unwrap();
        assert_eq!(err, PlaybackError::NetworkStall("load superseded".to_string()));
    }

    #[test]
    fn load_replaced_mid_fetch_is_not_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tone.wav");
        std::fs::write(&p, test_wav(8_000, 4_000)).unwrap();

        // current for the read, replaced by the time it returns
        let checks = std::cell::Cell::new(0);
        let superseded = || {
            checks.set(checks.get() + 1);
            checks.get() > 1
        };
        let err = load_media(p.to_str().unwrap(), LIMITS, &superseded).err().unwrap();
        assert!(matches!(err, PlaybackError::NetworkStall(_)));
        assert_eq!(checks.get(), 2);
    }
}

use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::model::Track;

pub(crate) const UNKNOWN_ARTIST: &str = "Unknown artist";

const ARTWORK_NAMES: [&str; 4] = ["cover.jpg", "cover.png", "folder.jpg", "folder.png"];

pub(super) fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

pub(super) fn is_remote(arg: &str) -> bool {
    let lower = arg.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `file://` URL for a sibling cover image, if the directory has one.
fn artwork_for(path: &Path) -> Option<String> {
    let dir = path.parent()?;
    ARTWORK_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .map(|candidate| format!("file://{}", candidate.display()))
}

/// Read tags and properties from `path` into a track record with `id` 0.
fn track_from_path(path: &Path) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = UNKNOWN_ARTIST.to_string();
    let mut genre: Option<String> = None;
    let mut duration_hint: Option<f64> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let secs = tagged.properties().duration().as_secs_f64();
            if secs > 0.0 {
                duration_hint = Some(secs);
            }

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title().map(|v| v.trim().to_string()) {
                    if !v.is_empty() {
                        title = v;
                    }
                }
                if let Some(v) = tag.artist().map(|v| v.trim().to_string()) {
                    if !v.is_empty() {
                        artist = v;
                    }
                }
                genre = tag
                    .genre()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
            }
        }
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    Track {
        id: 0,
        title,
        artist,
        artwork_url: artwork_for(path),
        audio_url: path.display().to_string(),
        genre,
        duration_hint,
    }
}

/// Walk `dir` and return every audio file as a track, sorted by display name.
///
/// Ids are assigned `1..=n` after sorting so they are stable for a given tree.
pub fn scan(dir: &Path, settings: &CatalogSettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(track_from_path(path));
        }
    }

    tracks.sort_by_key(|t| t.display().to_lowercase());
    for (i, t) in tracks.iter_mut().enumerate() {
        t.id = i as u64 + 1;
    }

    tracing::info!(dir = %dir.display(), count = tracks.len(), "catalog scanned");
    tracks
}

/// Build an ad-hoc track for a single command-line argument: a local file or
/// an `http(s)://` URL. Directories are handled by [`scan`].
pub fn from_arg(arg: &str, id: u64) -> Track {
    if is_remote(arg) {
        let url = arg.trim();
        let title = url
            .rsplit('/')
            .find(|seg| !seg.is_empty())
            .map(|seg| seg.split(['?', '#']).next().unwrap_or(seg))
            .unwrap_or(url)
            .to_string();
        return Track {
            id,
            title,
            artist: UNKNOWN_ARTIST.to_string(),
            artwork_url: None,
            audio_url: url.to_string(),
            genre: None,
            duration_hint: None,
        };
    }

    let path = Path::new(arg.strip_prefix("file://").unwrap_or(arg));
    Track {
        id,
        ..track_from_path(path)
    }
}

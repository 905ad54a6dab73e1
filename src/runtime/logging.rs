//! File logging.
//!
//! The terminal belongs to the UI, so log lines go to a file instead:
//! `$ENCORE_LOG_FILE`, else `$XDG_STATE_HOME/encore/encore.log`, else
//! `~/.local/state/encore/encore.log`. The filter is read from `ENCORE_LOG`
//! and defaults to `info`.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logging stays off when no log file can
/// be opened.
pub fn init() {
    let Some(path) = log_path(|key| std::env::var_os(key)) else {
        return;
    };
    let Some(file) = open_log(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("ENCORE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn open_log(path: &Path) -> Option<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

pub(super) fn log_path(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(p) = var("ENCORE_LOG_FILE") {
        return Some(PathBuf::from(p));
    }
    let state_home = match var("XDG_STATE_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(var("HOME")?).join(".local").join("state"),
    };
    Some(state_home.join("encore").join("encore.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_log_file_wins() {
        let path = log_path(env(&[
            ("ENCORE_LOG_FILE", "/tmp/encore.log"),
            ("XDG_STATE_HOME", "/state"),
        ]));
        assert_eq!(path, Some(PathBuf::from("/tmp/encore.log")));
    }

    #[test]
    fn xdg_state_home_is_used_next() {
        let path = log_path(env(&[("XDG_STATE_HOME", "/state"), ("HOME", "/home/u")]));
        assert_eq!(path, Some(PathBuf::from("/state/encore/encore.log")));
    }

    #[test]
    fn falls_back_to_home() {
        let path = log_path(env(&[("HOME", "/home/u")]));
        assert_eq!(path, Some(PathBuf::from("/home/u/.local/state/encore/encore.log")));
    }

    #[test]
    fn no_home_means_no_log() {
        assert_eq!(log_path(env(&[])), None);
    }

    #[test]
    fn open_log_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("encore.log");
        assert!(open_log(&path).is_some());
        assert!(path.exists());
    }
}

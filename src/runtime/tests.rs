use super::args::{Args, parse};
use super::build_catalog;
use crate::config::CatalogSettings;

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_collects_inputs_and_flags() {
    let args = parse(strings(&["--dump-config", "~/Music", "https://x/y.mp3"]));
    assert_eq!(
        args,
        Args {
            dump_config: true,
            inputs: strings(&["~/Music", "https://x/y.mp3"]),
        }
    );
}

#[test]
fn parse_treats_everything_after_double_dash_as_input() {
    let args = parse(strings(&["--", "--dump-config"]));
    assert!(!args.dump_config);
    assert_eq!(args.inputs, strings(&["--dump-config"]));
}

#[test]
fn build_catalog_mixes_directories_files_and_urls_with_fresh_ids() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
    std::fs::write(dir.path().join("b.flac"), b"").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

    let inputs = vec![
        dir.path().to_string_lossy().into_owned(),
        "https://cdn.example/stream/song.mp3?token=1".to_string(),
    ];
    let tracks = build_catalog(&inputs, &CatalogSettings::default());

    assert_eq!(tracks.len(), 3);
    let ids: Vec<u64> = tracks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(tracks[2].audio_url, "https://cdn.example/stream/song.mp3?token=1");
}

#[test]
fn build_catalog_of_nothing_is_empty() {
    assert!(build_catalog(&[], &CatalogSettings::default()).is_empty());
}

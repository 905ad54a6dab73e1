use super::*;
use crate::catalog::Track;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn t(id: u64, title: &str) -> Track {
    Track {
        id,
        title: title.into(),
        artist: "Artist".into(),
        artwork_url: None,
        audio_url: format!("/music/{title}.mp3"),
        genre: None,
        duration_hint: None,
    }
}

fn app(n: u64) -> App {
    App::new((1..=n).map(|i| t(i, &format!("Song {i}"))).collect())
}

#[test]
fn cursor_wraps_both_ways() {
    let mut app = app(3);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.select_last();
    assert_eq!(app.selected, 2);
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn cursor_moves_are_safe_on_an_empty_catalog() {
    let mut app = App::new(Vec::new());
    app.next();
    app.prev();
    app.set_selected(5);
    assert_eq!(app.selected, 0);
    assert!(app.play_selected().is_none());
    assert!(app.next_track().is_none());
    assert!(app.prev_track().is_none());
}

#[test]
fn play_selected_makes_the_cursor_track_current() {
    let mut app = app(4);
    app.set_selected(2);
    let track = app.play_selected().unwrap();
    assert_eq!(track.id, 3);
    assert_eq!(app.current_index(), Some(2));
    assert_eq!(app.current_track().map(|t| t.id), Some(3));
}

#[test]
fn next_and_prev_track_wrap_in_list_order() {
    let mut app = app(3);
    assert_eq!(app.next_track().map(|t| t.id), Some(1));
    assert_eq!(app.next_track().map(|t| t.id), Some(2));
    assert_eq!(app.next_track().map(|t| t.id), Some(3));
    assert_eq!(app.next_track().map(|t| t.id), Some(1));
    assert_eq!(app.prev_track().map(|t| t.id), Some(3));
    // the cursor follows the current track
    assert_eq!(app.selected, 2);
}

#[test]
fn prev_track_without_a_current_track_starts_at_the_end() {
    let mut app = app(3);
    assert_eq!(app.prev_track().map(|t| t.id), Some(3));
}

#[test]
fn shuffle_is_a_permutation_headed_by_the_current_track() {
    let mut app = app(10);
    app.set_selected(6);
    app.play_selected();

    let mut rng = StdRng::seed_from_u64(7);
    app.set_shuffle_with(true, &mut rng);

    assert!(app.is_shuffled());
    let order = app.play_order().to_vec();
    assert_eq!(order[0], 6);
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..10).collect::<Vec<_>>());
}

#[test]
fn next_track_follows_the_shuffled_order() {
    let mut app = app(6);
    app.play_selected();
    let mut rng = StdRng::seed_from_u64(42);
    app.set_shuffle_with(true, &mut rng);
    let order = app.play_order().to_vec();

    for &expected in order.iter().skip(1).chain(order.first()) {
        let track = app.next_track().unwrap();
        assert_eq!(track.id, expected as u64 + 1);
    }
}

#[test]
fn selecting_while_shuffled_moves_the_track_to_the_head() {
    let mut app = app(8);
    let mut rng = StdRng::seed_from_u64(3);
    app.set_shuffle_with(true, &mut rng);

    app.set_selected(5);
    app.play_selected();
    let order = app.play_order();
    assert_eq!(order[0], 5);
    assert_eq!(order.len(), 8);
}

#[test]
fn unshuffle_restores_list_order() {
    let mut app = app(5);
    let mut rng = StdRng::seed_from_u64(1);
    app.set_shuffle_with(true, &mut rng);
    app.set_shuffle_with(false, &mut rng);
    assert!(!app.is_shuffled());
    assert_eq!(app.play_order(), &[0, 1, 2, 3, 4]);
}

#[test]
fn setting_the_same_shuffle_flag_keeps_the_order() {
    let mut app = app(5);
    let mut rng = StdRng::seed_from_u64(9);
    app.set_shuffle_with(true, &mut rng);
    let before = app.play_order().to_vec();
    app.set_shuffle_with(true, &mut rng);
    assert_eq!(app.play_order(), before.as_slice());
}

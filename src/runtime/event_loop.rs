use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{Intent, PlaybackController, SignalSource, Status};
use crate::config;
use crate::ui;

/// Longest wait for input while no frame is due.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Main terminal event loop.
///
/// Single-threaded: each pass drains source events, runs the frame task if
/// due, redraws on change, then waits for input no longer than the next
/// frame deadline. Returns `Ok(())` when shutdown is requested.
pub fn run<S: SignalSource>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pending_gg = false;
    let mut last_status = controller.state().status;
    let mut drawn_revision: Option<u64> = None;
    let mut dirty = true;

    loop {
        controller.pump_events();
        controller.on_frame(Instant::now());

        let status = controller.state().status;
        if status == Status::Ended && last_status != Status::Ended && settings.playback.auto_advance
        {
            if let Some(track) = app.next_track() {
                controller.select_track(track);
            }
        }
        last_status = controller.state().status;

        if dirty || drawn_revision != Some(controller.revision()) {
            terminal.draw(|f| {
                ui::draw(
                    f,
                    app,
                    controller.state(),
                    controller.frame(),
                    &settings.ui,
                    &settings.controls,
                )
            })?;
            drawn_revision = Some(controller.revision());
            dirty = false;
        }

        let timeout = controller
            .next_frame_in(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, controller, &mut pending_gg) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns true when the user asked to quit.
///
/// Navigation keys move the cursor; everything else becomes a player
/// [`Intent`].
fn handle_key_event<S: SignalSource>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<S>,
    pending_gg: &mut bool,
) -> bool {
    let was_gg = std::mem::take(pending_gg);
    let scrub = settings.controls.scrub_seconds as f64;
    let step = settings.controls.volume_step;
    let volume = controller.state().volume;

    let intent = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if was_gg {
                app.select_first();
            } else {
                *pending_gg = true;
            }
            None
        }
        KeyCode::Char('G') => {
            app.select_last();
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.prev();
            None
        }
        KeyCode::Enter => app.play_selected().map(Intent::SelectTrack),
        KeyCode::Char('n') => app.next_track().map(Intent::SelectTrack),
        KeyCode::Char('N') => app.prev_track().map(Intent::SelectTrack),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Intent::TogglePlay),
        KeyCode::Char('L') => Some(Intent::SeekBy(scrub)),
        KeyCode::Char('H') => Some(Intent::SeekBy(-scrub)),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Intent::SetVolume(volume + step)),
        KeyCode::Char('-') => Some(Intent::SetVolume(volume - step)),
        KeyCode::Char('m') => Some(Intent::ToggleMute),
        KeyCode::Char('s') => Some(Intent::ToggleShuffle),
        KeyCode::Char('r') => Some(Intent::ToggleRepeat),
        KeyCode::Char('R') => Some(Intent::Retry),
        _ => None,
    };

    if let Some(intent) = intent {
        let shuffle_changed = intent == Intent::ToggleShuffle;
        controller.apply(intent);
        if shuffle_changed {
            app.set_shuffle(controller.state().shuffle);
        }
    }
    false
}

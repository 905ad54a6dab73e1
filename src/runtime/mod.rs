use std::env;
use std::path::Path;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{ControllerConfig, PlaybackController, RodioSource};
use crate::catalog::{self, Track};
use crate::config::CatalogSettings;

mod args;
mod event_loop;
mod logging;
mod settings;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::parse(env::args().skip(1));
    logging::init();
    let settings::LoadedSettings { settings, notice } = settings::load_settings();

    if args.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let inputs = if args.inputs.is_empty() {
        vec![
            env::current_dir()
                .ok()
                .and_then(|p| p.to_str().map(|s| s.to_string()))
                .unwrap_or_else(|| ".".to_string()),
        ]
    } else {
        args.inputs
    };

    let tracks = build_catalog(&inputs, &settings.catalog);
    tracing::info!(tracks = tracks.len(), "catalog ready");

    let mut app = App::new(tracks);
    app.set_source_label(inputs.join(", "));
    app.notice = notice;
    app.set_shuffle(settings.playback.shuffle);

    let source = RodioSource::new(&settings.audio);
    let mut controller = PlaybackController::new(source, ControllerConfig::from_settings(&settings));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut controller);

    // Release the output device before handing the terminal back.
    drop(controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// Gather tracks from every input: directories are scanned, anything else
/// becomes a single ad-hoc track. Ids are renumbered across inputs.
pub(crate) fn build_catalog(inputs: &[String], settings: &CatalogSettings) -> Vec<Track> {
    let mut tracks = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            tracks.extend(catalog::scan(path, settings));
        } else {
            tracks.push(catalog::from_arg(input, 0));
        }
    }
    for (i, track) in tracks.iter_mut().enumerate() {
        track.id = i as u64 + 1;
    }
    tracks
}

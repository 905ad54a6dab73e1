//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! header, the now-playing box with its progress gauge, the spectrum bars,
//! the track list and the controls footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::audio::{BARS, PlaybackState, Status, VisualizationFrame};
use crate::config::{ControlsSettings, TimeField, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("n/N".to_string(), "next/prev song".to_string());
    // H/L is filled dynamically from config.
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("R".to_string(), "retry".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "n/N", "H/L", "+/-", "m", "s", "r", "R", "gg/G", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
///
/// Total and remaining are left out while the duration is unknown.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Transport indicators: status, volume/mute, shuffle, repeat.
fn transport_text(state: &PlaybackState) -> String {
    let volume = if state.muted {
        "MUTED".to_string()
    } else {
        format!("VOL {:>3}%", (state.volume * 100.0).round() as u32)
    };
    let flag = |on: bool| if on { "on" } else { "off" };
    [
        state.status.label().to_uppercase(),
        volume,
        format!("SHUFFLE {}", flag(state.shuffle)),
        format!("REPEAT {}", flag(state.repeat)),
    ]
    .join(" • ")
}

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `frame` as `height` rows of text, top row first. Each bar is
/// `bar_width` cells wide with one blank column after it; partial cells use
/// eighth blocks.
fn bar_rows(frame: &VisualizationFrame, height: usize, bar_width: usize) -> Vec<String> {
    let mut rows = vec![String::new(); height];
    for &v in frame.bars() {
        let eighths = (v.clamp(0.0, 1.0) * (height * 8) as f32).round() as usize;
        for (r, row) in rows.iter_mut().enumerate() {
            let floor = (height - 1 - r) * 8;
            let fill = eighths.saturating_sub(floor).min(8);
            row.extend(std::iter::repeat_n(LEVELS[fill], bar_width));
            row.push(' ');
        }
    }
    rows
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    state: &PlaybackState,
    visualization: &VisualizationFrame,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header_text = match &app.source_label {
        Some(label) => format!("{} {}", ui_settings.header_text, label),
        None => ui_settings.header_text.clone(),
    };
    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    {
        let block = Block::bordered()
            .padding(Padding {
                left: 1,
                right: 1,
                top: 0,
                bottom: 0,
            })
            .title(" now playing ");
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(inner);

        let track = state
            .track_id
            .and_then(|id| app.tracks.iter().find(|t| t.id == id));
        let song = match track {
            Some(t) => match &t.genre {
                Some(genre) => format!("{} [{}]", t.display(), genre),
                None => t.display(),
            },
            None => "Nothing selected".to_string(),
        };

        let mut lines = vec![song, transport_text(state)];
        if let Some(kind) = state.error {
            lines.push(format!("Error: {} (R to retry)", kind.describe()));
        } else if let Some(notice) = &app.notice {
            lines.push(notice.clone());
        }
        let info = Paragraph::new(lines.join("\n")).wrap(Wrap { trim: true });
        let info = if state.status == Status::Errored {
            info.red()
        } else {
            info
        };
        frame.render_widget(info, rows[0]);

        let elapsed = secs(state.position_secs);
        let total = state.duration_secs.map(secs);
        let label = if state.status == Status::Loading {
            "loading…".to_string()
        } else {
            now_playing_time_text(elapsed, total, ui_settings).unwrap_or_default()
        };
        let gauge = Gauge::default()
            .ratio(state.progress().unwrap_or(0.0))
            .label(label)
            .gauge_style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(gauge, rows[1]);
    }

    // Spectrum
    {
        let block = Block::default().borders(Borders::ALL).title(" spectrum ");
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        let bar_width = (inner.width as usize / BARS).saturating_sub(1).max(1);
        let rows = bar_rows(visualization, inner.height as usize, bar_width);
        let bars = Paragraph::new(rows.join("\n")).alignment(Alignment::Center);
        frame.render_widget(bars, inner);
    }

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Important: only build ListItems for the visible window (avoid allocating the entire list).
        let total = app.tracks.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .map(|t| {
                let marker = if Some(t.id) == state.track_id { "♪ " } else { "  " };
                match t.duration_hint {
                    Some(d) => ListItem::new(format!(
                        "{}{}  ({})",
                        marker,
                        t.display(),
                        format_mmss(secs(d))
                    )),
                    None => ListItem::new(format!("{}{}", marker, t.display())),
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ratatui::widgets::ListState::default();
        if total > 0 {
            list_state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut list_state);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}

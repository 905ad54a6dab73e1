//! Application model: the track list, the selection cursor and the play order.
//!
//! The play order is what next/previous walk through. It is the list order
//! unless shuffle is on, in which case it is a random permutation with the
//! current track moved to the head.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::Track;

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    /// Cursor position in `tracks`.
    pub selected: usize,
    /// Index in `tracks` of the track last handed to the player.
    current: Option<usize>,
    order: Vec<usize>,
    shuffled: bool,
    /// Where the tracks came from, shown in the header.
    pub source_label: Option<String>,
    /// One-off message for the status line, e.g. an ignored config file.
    pub notice: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        let order = (0..tracks.len()).collect();
        Self {
            tracks,
            selected: 0,
            current: None,
            order,
            shuffled: false,
            source_label: None,
            notice: None,
        }
    }

    pub fn set_source_label(&mut self, label: String) {
        self.source_label = Some(label);
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    #[cfg(test)]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[cfg(test)]
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    #[cfg(test)]
    pub fn play_order(&self) -> &[usize] {
        &self.order
    }

    #[cfg(test)]
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Move the cursor to `idx`, clamped to the list.
    #[cfg(test)]
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.tracks.len().saturating_sub(1));
    }

    /// Move selection to the next track, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.tracks.len() - 1);
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    /// Make the selected track current and return it for the player.
    pub fn play_selected(&mut self) -> Option<Track> {
        let track = self.tracks.get(self.selected)?.clone();
        self.current = Some(self.selected);
        if self.shuffled {
            self.move_current_to_head();
        }
        Some(track)
    }

    /// Advance the current track along the play order, wrapping around.
    pub fn next_track(&mut self) -> Option<Track> {
        self.step(1)
    }

    /// Step back along the play order, wrapping around.
    pub fn prev_track(&mut self) -> Option<Track> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Option<Track> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len() as isize;
        let pos = match self.current.and_then(|c| self.order.iter().position(|&i| i == c)) {
            Some(p) => (p as isize + delta).rem_euclid(len) as usize,
            None if delta >= 0 => 0,
            None => self.order.len() - 1,
        };
        let idx = self.order[pos];
        self.current = Some(idx);
        self.selected = idx;
        self.tracks.get(idx).cloned()
    }

    /// Follow the player's advisory shuffle flag.
    pub fn set_shuffle(&mut self, on: bool) {
        self.set_shuffle_with(on, &mut rand::rng());
    }

    /// Like [`Self::set_shuffle`] with an explicit random source.
    pub fn set_shuffle_with<R: Rng + ?Sized>(&mut self, on: bool, rng: &mut R) {
        if on == self.shuffled {
            return;
        }
        self.shuffled = on;
        self.order = (0..self.tracks.len()).collect();
        if on {
            self.order.shuffle(rng);
            self.move_current_to_head();
        }
    }

    fn move_current_to_head(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if let Some(p) = self.order.iter().position(|&i| i == current) {
            self.order[..=p].rotate_right(1);
        }
    }
}

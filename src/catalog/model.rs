/// A playable catalog entry.
///
/// Read-only once handed to the player: selecting a different song replaces
/// the whole record rather than mutating `audio_url` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub artwork_url: Option<String>,
    pub audio_url: String,
    pub genre: Option<String>,
    /// Duration reported by the catalog, if any. The player only trusts the
    /// duration its signal source resolves.
    pub duration_hint: Option<f64>,
}

impl Track {
    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

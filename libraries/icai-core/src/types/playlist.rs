/// Playlist domain type
use crate::types::{Song, SongId};
use serde::{Deserialize, Serialize};

/// Named, ordered list of songs
///
/// In-memory only. Duplicates are allowed; removal drops the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    name: String,
    songs: Vec<Song>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_songs(name, Vec::new())
    }

    /// Create a playlist from existing songs
    pub fn with_songs(name: impl Into<String>, songs: Vec<Song>) -> Self {
        Self {
            name: name.into(),
            songs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find a song by id
    pub fn get_song(&self, id: &SongId) -> Option<&Song> {
        self.songs.iter().find(|song| song.id() == id)
    }

    /// Append a song
    pub fn add_song(&mut self, song: Song) {
        self.songs.push(song);
    }

    /// Remove the first occurrence of `song`
    ///
    /// Returns the removed song, or `None` if it was not in the playlist.
    pub fn remove_song(&mut self, song: &Song) -> Option<Song> {
        let index = self.songs.iter().position(|s| s == song)?;
        Some(self.songs.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Consume the playlist, yielding its songs in order
    pub fn into_songs(self) -> Vec<Song> {
        self.songs
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Song;
    type IntoIter = std::slice::Iter<'a, Song>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song::new(SongId::new(id), format!("Song {}", id), format!("/music/{}.mp3", id), 0)
    }

    #[test]
    fn playlist_creation() {
        let playlist = Playlist::new("Road Trip");
        assert_eq!(playlist.name(), "Road Trip");
        assert!(playlist.is_empty());
    }

    #[test]
    fn remove_song_drops_first_match_only() {
        let mut playlist = Playlist::with_songs("Loop", vec![song("1"), song("2"), song("1")]);

        let removed = playlist.remove_song(&song("1"));
        assert_eq!(removed, Some(song("1")));

        let ids: Vec<&str> = playlist.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn remove_missing_song_is_a_no_op() {
        let mut playlist = Playlist::with_songs("One", vec![song("1")]);
        assert_eq!(playlist.remove_song(&song("9")), None);
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn get_song_by_id() {
        let playlist = Playlist::with_songs("Two", vec![song("1"), song("2")]);

        assert_eq!(playlist.get_song(&SongId::new("2")).map(|s| s.title()), Some("Song 2"));
        assert!(playlist.get_song(&SongId::new("3")).is_none());
    }
}

//! Pending song queue
//!
//! Holds songs waiting to play, in playback order. The song currently
//! playing is never in here; it belongs to the session.
//!
//! Index handling is lenient: inserting past the end appends and removing an
//! index that does not exist does nothing.

use icai_core::Song;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ordered list of songs awaiting playback
///
/// ```text
/// Currently Playing: Song A      (owned by the session)
/// ─────────────────────────────
/// Queue:
///   0 - Song B   <- pop_front() for auto-advance
///   1 - Song C
///   2 - Song B   (duplicates allowed)
/// ```
#[derive(Debug, Clone, Default)]
pub struct Queue {
    songs: VecDeque<Arc<Song>>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a song
    ///
    /// `None` appends. An index past the end is clamped to the end.
    /// Returns the position the song landed at.
    pub fn insert(&mut self, song: Arc<Song>, index: Option<usize>) -> usize {
        let position = index.map_or(self.songs.len(), |index| index.min(self.songs.len()));
        self.songs.insert(position, song);
        position
    }

    /// Remove the song at `index`
    ///
    /// Returns `None` without touching the queue if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Arc<Song>> {
        self.songs.remove(index)
    }

    /// Remove and return the next song to play
    pub fn pop_front(&mut self) -> Option<Arc<Song>> {
        self.songs.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Song>> {
        self.songs.iter()
    }

    /// Songs in playback order
    pub fn to_vec(&self) -> Vec<Arc<Song>> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

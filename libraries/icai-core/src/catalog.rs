//! Song catalog trait and an in-memory implementation

use crate::error::{CoreError, Result};
use crate::types::{is_supported_audio, Playlist, Song, SongId};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Name of the playlist returned by [`SongCatalog::all_songs`]
pub const ALL_SONGS_PLAYLIST: &str = "All Songs";

/// Read-only source of `Song` records
///
/// The playback engine only ever reads from a catalog. Implementations may
/// be backed by a database, a remote API, or memory.
#[async_trait]
pub trait SongCatalog: Send + Sync {
    /// Get a song by id
    async fn song(&self, id: &SongId) -> Result<Option<Song>>;

    /// Get a song by its file locator
    async fn song_by_locator(&self, locator: &Path) -> Result<Option<Song>>;

    /// Every known song, as the "All Songs" playlist
    async fn all_songs(&self) -> Result<Playlist>;
}

/// In-memory catalog
///
/// Ids are assigned sequentially starting at 1, in registration order.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogInner>,
}

#[derive(Debug, Default)]
struct CatalogInner {
    songs: Vec<Song>,
    next_id: u64,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, deriving the title from its file stem
    ///
    /// Fails with `InvalidInput` for unsupported extensions and `Duplicate`
    /// if the locator is already registered.
    pub async fn register(&self, locator: impl Into<PathBuf>) -> Result<Song> {
        let locator = locator.into();
        if !is_supported_audio(&locator) {
            return Err(CoreError::invalid_input(format!(
                "unsupported audio file: {}",
                locator.display()
            )));
        }

        let mut inner = self.inner.write().await;
        if inner.songs.iter().any(|song| song.locator() == locator) {
            return Err(CoreError::Duplicate(locator.display().to_string()));
        }

        inner.next_id += 1;
        let song = Song::from_path(SongId::from(inner.next_id), locator);
        debug!("Registered song {} ({})", song.id(), song.locator().display());
        inner.songs.push(song.clone());
        Ok(song)
    }

    /// Remove a song by locator
    pub async fn unregister(&self, locator: &Path) -> Result<Song> {
        let mut inner = self.inner.write().await;
        let index = inner
            .songs
            .iter()
            .position(|song| song.locator() == locator)
            .ok_or_else(|| CoreError::not_found("Song", locator.display().to_string()))?;

        Ok(inner.songs.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.songs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.songs.is_empty()
    }
}

#[async_trait]
impl SongCatalog for MemoryCatalog {
    async fn song(&self, id: &SongId) -> Result<Option<Song>> {
        let inner = self.inner.read().await;
        Ok(inner.songs.iter().find(|song| song.id() == id).cloned())
    }

    async fn song_by_locator(&self, locator: &Path) -> Result<Option<Song>> {
        let inner = self.inner.read().await;
        Ok(inner
            .songs
            .iter()
            .find(|song| song.locator() == locator)
            .cloned())
    }

    async fn all_songs(&self) -> Result<Playlist> {
        let inner = self.inner.read().await;
        Ok(Playlist::with_songs(ALL_SONGS_PLAYLIST, inner.songs.clone()))
    }
}

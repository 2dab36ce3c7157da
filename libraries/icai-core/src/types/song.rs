/// Song domain type
use crate::types::SongId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File extensions the library accepts as playable audio
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Check whether a path has one of the [`SUPPORTED_EXTENSIONS`]
///
/// The comparison is case-insensitive; paths without an extension are rejected.
pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// Immutable metadata record for a track
///
/// Two songs are equal when their ids are equal, regardless of the other
/// fields. Play count is informational here; incrementing it belongs to
/// whatever owns the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    id: SongId,
    title: String,
    locator: PathBuf,
    play_count: u32,
}

impl Song {
    /// Create a new song record
    pub fn new(
        id: SongId,
        title: impl Into<String>,
        locator: impl Into<PathBuf>,
        play_count: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            locator: locator.into(),
            play_count,
        }
    }

    /// Create a song whose title is the file stem of `locator`
    pub fn from_path(id: SongId, locator: impl Into<PathBuf>) -> Self {
        let locator = locator.into();
        let title = locator
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| locator.display().to_string());

        Self::new(id, title, locator, 0)
    }

    pub fn id(&self) -> &SongId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Where the audio bytes live
    pub fn locator(&self) -> &Path {
        &self.locator
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Song {}

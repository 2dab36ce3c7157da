//! Icai Core
//!
//! Song catalog types and traits shared by the playback engine and its
//! front-ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongId`, `Playlist`
//! - **Core Traits**: `SongCatalog` (read-only song lookup)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! The playback engine never writes to a catalog; it only receives `Song`
//! records that a catalog handed out.
//!
//! # Example
//!
//! ```rust
//! use icai_core::{Playlist, Song, SongId};
//!
//! let song = Song::new(SongId::new("1"), "Intro", "/music/intro.mp3", 0);
//!
//! let mut playlist = Playlist::new("Favourites");
//! playlist.add_song(song.clone());
//!
//! assert_eq!(playlist.get_song(song.id()), Some(&song));
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{MemoryCatalog, SongCatalog, ALL_SONGS_PLAYLIST};
pub use error::{CoreError, Result};
pub use types::{is_supported_audio, Playlist, Song, SongId, SUPPORTED_EXTENSIONS};

mod ids;
mod playlist;
mod song;

pub use ids::SongId;
pub use playlist::Playlist;
pub use song::{is_supported_audio, Song, SUPPORTED_EXTENSIONS};
